pub mod codec;
pub mod collect;
pub mod logging;
pub mod reporters;
