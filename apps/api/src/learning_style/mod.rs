// Learning-style survey: classification into one of four styles, with an
// optional narrative analysis from the generator.

pub mod classifier;
pub mod handlers;
pub mod prompts;
