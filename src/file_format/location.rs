use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Syntactic role of a reference.  This is a small closed set that front ends
/// map their own vocabulary onto in their dump output; we never encode a
/// specific front end's internal numbering.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum RefKind {
    Decl,
    Def,
    Use,
    Call,
    Read,
    Write,
    TypeRef,
    MacroRef,
}

impl RefKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefKind::Decl => "decl",
            RefKind::Def => "def",
            RefKind::Use => "use",
            RefKind::Call => "call",
            RefKind::Read => "read",
            RefKind::Write => "write",
            RefKind::TypeRef => "type",
            RefKind::MacroRef => "macro",
        }
    }
}

impl fmt::Display for RefKind {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for RefKind {
    type Err = String;

    fn from_str(s: &str) -> Result<RefKind, String> {
        match s {
            "decl" => Ok(RefKind::Decl),
            "def" => Ok(RefKind::Def),
            "use" => Ok(RefKind::Use),
            "call" => Ok(RefKind::Call),
            "read" => Ok(RefKind::Read),
            "write" => Ok(RefKind::Write),
            "type" => Ok(RefKind::TypeRef),
            "macro" => Ok(RefKind::MacroRef),
            _ => Err(format!("unknown reference kind '{}'", s)),
        }
    }
}

/// One occurrence that refers to a symbol: the physical position of the
/// referencing token plus its syntactic role.  Rendered canonically as
/// `path:lineno:col:kind`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct RefLocation {
    pub path: String,
    pub lineno: u32,
    pub col: u32,
    pub kind: RefKind,
}

impl fmt::Display for RefLocation {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(
            formatter,
            "{}:{}:{}:{}",
            self.path, self.lineno, self.col, self.kind
        )
    }
}

// Ordered by the canonical string so that set iteration and the serialized
// artifact agree on a single deterministic order.
impl Ord for RefLocation {
    fn cmp(&self, other: &RefLocation) -> Ordering {
        self.to_string().cmp(&other.to_string())
    }
}

impl PartialOrd for RefLocation {
    fn partial_cmp(&self, other: &RefLocation) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for RefLocation {
    type Err = String;

    /// Inverse of the canonical rendering.  The path may itself contain
    /// colons, so the three trailing fields are split off the right-hand end.
    fn from_str(s: &str) -> Result<RefLocation, String> {
        let mut fields = s.rsplitn(4, ':');
        let kind = fields.next();
        let col = fields.next();
        let lineno = fields.next();
        let path = fields.next();
        match (path, lineno, col, kind) {
            (Some(path), Some(lineno), Some(col), Some(kind)) if !path.is_empty() => {
                let lineno: u32 = lineno
                    .parse()
                    .map_err(|_| format!("bad line number in location '{}'", s))?;
                let col: u32 = col
                    .parse()
                    .map_err(|_| format!("bad column in location '{}'", s))?;
                let kind: RefKind = kind.parse()?;
                Ok(RefLocation {
                    path: path.to_string(),
                    lineno,
                    col,
                    kind,
                })
            }
            _ => Err(format!("malformed location '{}'", s)),
        }
    }
}
