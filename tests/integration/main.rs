//! Integration tests driving the public API end to end.

mod replay;
mod suggestion;
