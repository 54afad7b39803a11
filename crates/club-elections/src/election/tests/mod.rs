mod ballot;
mod common;
mod overlay;
mod routing;
