pub mod ocr;
pub mod patterns;
pub mod similarity;
pub mod text;
pub mod verification;
