//! Small helpers shared by the fetch, rewrite and serve paths.

pub mod html;
pub mod mime;
