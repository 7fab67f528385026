pub mod captcha_solver;
pub mod form_submitter;
pub mod image_preprocessor;
pub mod result_extractor;
pub mod result_store;
pub mod session_bootstrapper;

pub use captcha_solver::CaptchaSolver;
pub use form_submitter::{FormSubmitter, SubmissionOutcome};
pub use result_extractor::{extract_detail, extract_listing};
pub use result_store::ResultStore;
pub use session_bootstrapper::SessionBootstrapper;
