pub mod derive;
pub mod info;
pub mod record;
pub mod stream;
