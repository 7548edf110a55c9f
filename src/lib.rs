//! copyrot library: the year-detection pipeline and its collaborators.

pub mod capture;
pub mod config;
pub mod detection;
pub mod imaging;
pub mod models;
pub mod ocr;
pub mod pipeline;
pub mod proof;
pub mod repository;
pub mod retry;
pub mod storage;
