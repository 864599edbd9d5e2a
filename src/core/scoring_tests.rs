//! Scoring pipeline unit tests
//!
//! Covers the linear regressor, batching, ranking, embeddings file IO, and
//! the lenient directory scan.

#[cfg(test)]
mod tests {
    use crate::core::models::{AppError, AppResult};
    use crate::core::scoring::{
        rank, read_embeddings_csv, score_embeddings, write_results_csv, ImageEmbedder,
        LinearRegressor, ScoreRegressor, ScoredThumbnail, ScoringConfig, ScoringPipeline, Shared,
    };
    use image::{DynamicImage, GenericImageView, RgbImage};
    use std::cell::Cell;
    use std::io::Write;
    use tempfile::tempdir;

    /// Embedder stub: a constant-dimension vector per image, counting batches.
    struct StubEmbedder {
        batches: Cell<usize>,
    }

    impl StubEmbedder {
        fn new() -> Self {
            Self {
                batches: Cell::new(0),
            }
        }
    }

    impl ImageEmbedder for StubEmbedder {
        fn embed_batch(&self, images: &[DynamicImage]) -> AppResult<Vec<Vec<f32>>> {
            self.batches.set(self.batches.get() + 1);
            Ok(images
                .iter()
                .map(|image| vec![image.width() as f32, 1.0, 0.0])
                .collect())
        }

        fn dimension(&self) -> usize {
            3
        }
    }

    fn test_image(width: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::new(width, 2))
    }

    #[test]
    fn linear_regressor_computes_dot_plus_bias() {
        let regressor = LinearRegressor {
            weights: vec![1.0, 2.0, 3.0],
            bias: 0.5,
        };

        let scores = regressor
            .predict_batch(&[vec![1.0, 1.0, 1.0], vec![0.0, 0.0, 2.0]])
            .unwrap();

        assert_eq!(scores, vec![6.5, 6.5]);
    }

    #[test]
    fn linear_regressor_rejects_wrong_dimension() {
        let regressor = LinearRegressor {
            weights: vec![1.0, 2.0],
            bias: 0.0,
        };

        let error = regressor.predict_batch(&[vec![1.0]]).unwrap_err();
        assert!(matches!(error, AppError::Model(_)));
    }

    #[test]
    fn regressor_loads_from_json_and_rejects_garbage() {
        let dir = tempdir().unwrap();

        let model_path = dir.path().join("model.json");
        std::fs::write(&model_path, r#"{"weights": [0.5, -1.0], "bias": 2.0}"#).unwrap();
        let regressor = LinearRegressor::from_json_file(&model_path).unwrap();
        assert_eq!(regressor.dimension(), 2);
        assert_eq!(regressor.bias, 2.0);

        let garbage_path = dir.path().join("garbage.json");
        std::fs::write(&garbage_path, "not json").unwrap();
        assert!(matches!(
            LinearRegressor::from_json_file(&garbage_path).unwrap_err(),
            AppError::Parse(_)
        ));

        assert!(matches!(
            LinearRegressor::from_json_file(dir.path().join("absent.json")).unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[test]
    fn pipeline_batches_images_and_scores_each() {
        let embedder = StubEmbedder::new();
        let regressor = LinearRegressor {
            weights: vec![1.0, 0.0, 0.0],
            bias: 0.0,
        };
        let pipeline =
            ScoringPipeline::new(embedder, regressor, ScoringConfig { batch_size: 2 });

        let names: Vec<String> = (1..=5).map(|i| format!("img{i}.png")).collect();
        let images: Vec<DynamicImage> = (1..=5).map(|i| test_image(i)).collect();

        let results = pipeline.score_images(&names, &images).unwrap();

        assert_eq!(results.len(), 5);
        assert_eq!(pipeline_batches(&pipeline), 3);
        for (index, item) in results.iter().enumerate() {
            assert_eq!(item.filename, format!("img{}.png", index + 1));
            assert_eq!(item.log_score, (index + 1) as f32);
            assert_eq!(item.views_per_subscriber_est, item.log_score.exp());
        }
    }

    fn pipeline_batches(
        pipeline: &ScoringPipeline<StubEmbedder, LinearRegressor>,
    ) -> usize {
        pipeline.embedder().batches.get()
    }

    #[test]
    fn pipeline_rejects_mismatched_name_count() {
        let pipeline = ScoringPipeline::new(
            StubEmbedder::new(),
            LinearRegressor {
                weights: vec![1.0, 0.0, 0.0],
                bias: 0.0,
            },
            ScoringConfig::default(),
        );

        let error = pipeline
            .score_images(&["a.png".to_string()], &[])
            .unwrap_err();
        assert!(matches!(error, AppError::Model(_)));
    }

    #[test]
    fn score_directory_skips_unreadable_images() {
        let dir = tempdir().unwrap();
        test_image(4).save(dir.path().join("good.png")).unwrap();
        let mut broken = std::fs::File::create(dir.path().join("broken.jpg")).unwrap();
        broken.write_all(b"this is not an image").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let pipeline = ScoringPipeline::new(
            StubEmbedder::new(),
            LinearRegressor {
                weights: vec![1.0, 0.0, 0.0],
                bias: 0.0,
            },
            ScoringConfig::default(),
        );

        let results = pipeline.score_directory(dir.path()).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].filename, "good.png");
        assert_eq!(results[0].log_score, 4.0);
    }

    #[test]
    fn score_directory_missing_dir_is_not_found() {
        let dir = tempdir().unwrap();
        let pipeline = ScoringPipeline::new(
            StubEmbedder::new(),
            LinearRegressor {
                weights: vec![1.0, 0.0, 0.0],
                bias: 0.0,
            },
            ScoringConfig::default(),
        );

        let error = pipeline
            .score_directory(dir.path().join("absent"))
            .unwrap_err();
        assert!(matches!(error, AppError::NotFound(_)));
    }

    #[test]
    fn rank_sorts_descending_and_keeps_input_order_on_ties() {
        let results = vec![
            scored("low", 1.0),
            scored("tie-first", 2.0),
            scored("tie-second", 2.0),
            scored("high", 3.0),
        ];

        let ranked = rank(results);
        let names: Vec<&str> = ranked.iter().map(|r| r.filename.as_str()).collect();

        assert_eq!(names, vec!["high", "tie-first", "tie-second", "low"]);
    }

    fn scored(name: &str, log_score: f32) -> ScoredThumbnail {
        ScoredThumbnail {
            filename: name.to_string(),
            log_score,
            views_per_subscriber_est: log_score.exp(),
        }
    }

    #[test]
    fn results_csv_is_truncated_on_rewrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.csv");

        write_results_csv(&path, &[scored("a.png", 1.0), scored("b.png", 2.0)]).unwrap();
        write_results_csv(&path, &[scored("c.png", 3.0)]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("filename").count(), 1);
        assert!(content.contains("c.png"));
        assert!(!content.contains("a.png"));
    }

    #[test]
    fn embeddings_csv_round_trips_names_and_vectors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("embeddings.csv");
        std::fs::write(&path, "a.png,1.0,2.0\nb.png,3.5,-1.25\n").unwrap();

        let (names, embeddings) = read_embeddings_csv(&path).unwrap();
        assert_eq!(names, vec!["a.png", "b.png"]);
        assert_eq!(embeddings, vec![vec![1.0, 2.0], vec![3.5, -1.25]]);

        let regressor = LinearRegressor {
            weights: vec![2.0, 1.0],
            bias: 0.0,
        };
        let results = score_embeddings(&regressor, 32, &names, &embeddings).unwrap();
        assert_eq!(results[0].log_score, 4.0);
        assert_eq!(results[1].log_score, 5.75);
    }

    #[test]
    fn embeddings_csv_rejects_non_numeric_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("embeddings.csv");
        std::fs::write(&path, "a.png,1.0,huge\n").unwrap();

        assert!(matches!(
            read_embeddings_csv(&path).unwrap_err(),
            AppError::Parse(_)
        ));
    }

    #[test]
    fn shared_initializes_exactly_once_across_clones() {
        let shared: Shared<usize> = Shared::new();
        let clone = shared.clone();

        assert!(clone.get().is_none());
        assert_eq!(*shared.get_or_init(|| 1), 1);
        assert_eq!(*clone.get_or_init(|| 2), 1);
        assert_eq!(clone.get(), Some(&1));
    }
}
