//! Configuration section definitions.
//!
//! | Module    | TOML Section | Purpose                              |
//! |-----------|--------------|--------------------------------------|
//! | `fetch`   | `[fetch]`    | Outbound request defaults            |
//! | `rewrite` | `[rewrite]`  | Link normalization                   |
//! | `serve`   | `[serve]`    | Proxy server                         |

mod fetch;
mod rewrite;
mod serve;

pub use fetch::FetchConfig;
pub use rewrite::RewriteConfig;
pub use serve::ServeConfig;
