pub mod status;
pub mod varnish;
pub mod wait;
