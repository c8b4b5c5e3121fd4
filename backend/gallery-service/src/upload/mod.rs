pub mod ingestor;
pub mod validator;

pub use ingestor::{IngestError, UploadIngestor};
pub use validator::{
    check_declared_length, check_file_size, validate, UploadCandidate, UploadLimits,
    UploadRejection, ValidatedUpload,
};
