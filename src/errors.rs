use snafu::Snafu;

pub type CustomResult<T> = Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// The document does not contain the expected number of matching tables.
    /// Ingesting anyway would risk reading unrelated data, so this is fatal.
    #[snafu(display(
        "unexpected html structure ({section}): expected {expected} matching table(s), found {found}"
    ))]
    UnexpectedStructure {
        section: &'static str,
        expected: usize,
        found: usize,
    },

    #[snafu(display("column '{column}' not found in {section} table"))]
    MissingColumn {
        column: String,
        section: &'static str,
    },

    #[snafu(display("no row labelled '{label}' in {section} table"))]
    MissingLabel {
        label: String,
        section: &'static str,
    },

    #[snafu(display(
        "expected exactly 3 numbers (season, division, race) in url '{url}', found {found}"
    ))]
    MalformedUrl { url: String, found: usize },

    #[snafu(display("could not parse '{value}' as {expected}"))]
    MalformedValue {
        value: String,
        expected: &'static str,
    },

    #[snafu(display("driver '{name}' does not appear in the results table"))]
    UnknownDriver { name: String },

    /// More than one driver of the same car owns a stint covering this lap.
    #[snafu(display(
        "ambiguous timing data: lap {lap} is covered by stints of drivers {candidates:?}"
    ))]
    AmbiguousDriver { lap: i32, candidates: Vec<i32> },

    #[snafu(display("file does not exist: {path}"))]
    FileDoesNotExist { path: String },

    #[snafu(display("permission denied: {path}"))]
    PermissionDenied { path: String },

    #[snafu(display("io error: {source}"))]
    #[snafu(context(false))]
    Io { source: std::io::Error },

    #[snafu(display("database error: {source}"))]
    #[snafu(context(false))]
    Database { source: diesel::result::Error },

    #[snafu(display("request failed: {source}"))]
    #[snafu(context(false))]
    Request { source: reqwest::Error },
}
