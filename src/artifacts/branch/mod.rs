pub mod branch_name;
pub mod revision;

/// Names that may not be used as branches, following Git's ref-name rules:
/// no leading dot or dot after a slash, no `..`, no leading or trailing slash,
/// no `.lock` suffix, no `@{`, no control or glob characters.
pub const INVALID_BRANCH_NAME_REGEX: &str =
    r"^\.|\/\.|\.\.|^\/|\/$|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]";

pub const HEADS_PREFIX: &str = "refs/heads/";
pub const REMOTES_PREFIX: &str = "refs/remotes/";
