//! File format parsing module

pub mod csv_parser;
