pub mod assessment;
pub mod content;
pub mod learning_style;
pub mod plan;
pub mod question;
pub mod submission;
