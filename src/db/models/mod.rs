pub mod paper;
pub mod paper_summary;
pub mod subscriber;

pub use paper::Model as Paper;
pub use paper_summary::Model as PaperSummary;
pub use subscriber::Model as Subscriber;
