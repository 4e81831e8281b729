use once_cell::sync::OnceCell;
use std::fmt;

/// Appended to a member name to form the name its original body is
/// preserved under.
pub const ORIGINAL_SUFFIX: &str = "__intercept_original";

/// Returns the name the original body of `member` is kept under.
pub fn preserved_name(member: &str) -> String {
    format!("{}{}", member, ORIGINAL_SUFFIX)
}

/// Describes a function or method compiled with `#[interceptable]`.
///
/// Instances are created by the attribute macro and live in statics.
pub struct Target {
    owner: Option<&'static str>,
    member: &'static str,
    module: &'static str,
    file: &'static str,
    line: u32,
    is_static: bool,
    is_public: bool,
    key: OnceCell<Key>,
}

impl Target {
    #[doc(hidden)]
    pub const fn __new(
        owner: Option<&'static str>,
        member: &'static str,
        module: &'static str,
        file: &'static str,
        line: u32,
        is_static: bool,
        is_public: bool,
    ) -> Self {
        Target {
            owner,
            member,
            module,
            file,
            line,
            is_static,
            is_public,
            key: OnceCell::new(),
        }
    }

    /// Name of the type the method belongs to, `None` for free functions.
    pub fn owner(&self) -> Option<&'static str> {
        self.owner
    }

    /// Name of the function or method.
    pub fn member(&self) -> &'static str {
        self.member
    }

    /// Module the target was defined in, as returned by `module_path!()`.
    pub fn module(&self) -> &'static str {
        self.module
    }

    /// File the target was defined in, as returned by `file!()`.
    pub fn file(&self) -> &'static str {
        self.file
    }

    /// Line of the `#[interceptable]` attribute.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// `true` for free functions and associated functions without a `self`
    /// receiver.
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// `true` if the target is declared `pub`.
    pub fn is_public(&self) -> bool {
        self.is_public
    }

    /// The normalized registry key.
    pub fn key(&self) -> &Key {
        self.key.get_or_init(|| Key::new(self.owner, self.member))
    }

    /// Name the original body is preserved under.
    pub fn preserved_name(&self) -> String {
        preserved_name(self.member)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.module)?;
        if let Some(owner) = self.owner {
            write!(f, "::{}", owner)?;
        }
        write!(f, "::{}", self.member)
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("owner", &self.owner)
            .field("member", &self.member)
            .field("module", &self.module)
            .field("file", &self.file)
            .field("line", &self.line)
            .field("is_static", &self.is_static)
            .field("is_public", &self.is_public)
            .finish()
    }
}

/// Normalized `(owner, member)` pair identifying an interception.
///
/// Any leading `::` is stripped before lower-casing, so `::Foo`, `foo` and
/// `FOO` all name the same owner.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Key {
    owner: Option<String>,
    member: String,
}

impl Key {
    /// Normalizes an owner and member name into a key.
    pub fn new(owner: Option<&str>, member: &str) -> Self {
        Key {
            owner: owner.map(normalize),
            member: normalize(member),
        }
    }

    /// The normalized owner, `None` for free functions.
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// The normalized member.
    pub fn member(&self) -> &str {
        &self.member
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.owner {
            Some(owner) => write!(f, "{}::{}", owner, self.member),
            None => f.write_str(&self.member),
        }
    }
}

fn normalize(name: &str) -> String {
    name.trim_start_matches("::").to_lowercase()
}
