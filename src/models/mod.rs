pub mod captcha;
pub mod loaders;
pub mod query;
pub mod record;

pub use captcha::CaptchaToken;
pub use loaders::{load_all_criteria, load_criteria_file};
pub use query::{
    PackageResult, QueryResult, SearchCriteria, StatusEvent, TrackingRow,
    DELIVERY_DATE_PLACEHOLDER,
};
pub use record::QueryRecord;
