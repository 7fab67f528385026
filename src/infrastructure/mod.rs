pub mod http_session;
pub mod ocr_engine;
pub mod scratch;

pub use http_session::{HttpResponse, HttpSession, HttpSessionFactory, SessionFactory, Transport};
pub use ocr_engine::{default_engine, DefaultEngine, OcrEngine};
pub use scratch::ScratchSpace;
