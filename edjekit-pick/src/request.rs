use std::path::PathBuf;

use edjekit_archive::Compression;
use tracing::trace;

use crate::error::UsageError;

/// Whether resources with byte-identical content are merged into one output blob when no
/// `--dedupe` flag is given.
pub const MERGE_DEDUPE: bool = false;

/// A single inclusion directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inclusion {
    /// Every group of the file (`-a <file>`).
    All(PathBuf),
    /// One named group of the file (`-i <file> -g <group>`).
    Group { file: PathBuf, group: String },
}

impl Inclusion {
    pub fn file(&self) -> &PathBuf {
        match self {
            Self::All(file) => file,
            Self::Group { file, .. } => file,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickOptions {
    /// Merge resources with identical content into a single blob.
    pub dedupe: bool,
    /// Compression used for every blob of the output archive.
    pub compression: Compression,
    /// Resolve and validate everything, but don't write the output file.
    pub dry_run: bool,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            dedupe: MERGE_DEDUPE,
            compression: Compression::Zlib,
            dry_run: false,
        }
    }
}

/// A parsed pick request. Inclusions keep the order they were given in, which decides the order
/// of groups in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickRequest {
    pub inclusions: Vec<Inclusion>,
    pub output: PathBuf,
    pub options: PickOptions,
}

impl PickRequest {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            inclusions: vec![],
            output: output.into(),
            options: PickOptions::default(),
        }
    }

    pub fn include_all(mut self, file: impl Into<PathBuf>) -> Self {
        self.inclusions.push(Inclusion::All(file.into()));
        self
    }

    pub fn include_group(mut self, file: impl Into<PathBuf>, group: &str) -> Self {
        self.inclusions.push(Inclusion::Group {
            file: file.into(),
            group: group.to_owned(),
        });
        self
    }

    pub fn with_options(mut self, options: PickOptions) -> Self {
        self.options = options;
        self
    }

    /// Parses command line tokens (without the program name).
    ///
    /// `-g` applies to the nearest preceding `-i`; an `-i` that is never followed by a `-g` is an
    /// error, as is a request without an output file or without any inclusion.
    pub fn parse<I, S>(tokens: I) -> Result<Self, UsageError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens = tokens.into_iter().map(Into::<String>::into);
        let mut inclusions = vec![];
        let mut output: Option<PathBuf> = None;
        let mut options = PickOptions::default();
        // The current `-i` file, and whether any `-g` has been attached to it yet.
        let mut input: Option<(PathBuf, bool)> = None;

        while let Some(token) = tokens.next() {
            trace!(%token, "Parsing argument");
            match token.as_str() {
                "-i" | "--input" => {
                    let file = PathBuf::from(expect_value(&mut tokens, &token)?);
                    finish_input(input.take())?;
                    input = Some((file, false));
                }
                "-g" | "--group" => {
                    let group = expect_value(&mut tokens, &token)?;
                    let Some((file, has_groups)) = &mut input else {
                        return Err(UsageError::GroupWithoutInput(group));
                    };
                    *has_groups = true;
                    inclusions.push(Inclusion::Group {
                        file: file.clone(),
                        group,
                    });
                }
                "-a" | "--all" => {
                    let file = expect_value(&mut tokens, &token)?;
                    inclusions.push(Inclusion::All(file.into()));
                }
                "-o" | "--output" => {
                    let file = expect_value(&mut tokens, &token)?;
                    if output.is_some() {
                        return Err(UsageError::DuplicateOutput);
                    }
                    output = Some(file.into());
                }
                "--dedupe" => options.dedupe = true,
                "--compression" => {
                    options.compression = expect_value(&mut tokens, &token)?
                        .parse()
                        .map_err(UsageError::InvalidCompression)?;
                }
                "-n" | "--dry-run" => options.dry_run = true,
                _ => return Err(UsageError::UnknownFlag(token)),
            }
        }
        finish_input(input)?;

        let output = output
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or(UsageError::MissingOutput)?;
        if inclusions.is_empty() {
            return Err(UsageError::NoInclusions);
        }

        Ok(Self {
            inclusions,
            output,
            options,
        })
    }
}

fn expect_value(tokens: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, UsageError> {
    tokens
        .next()
        .ok_or_else(|| UsageError::MissingValue(flag.to_owned()))
}

fn finish_input(input: Option<(PathBuf, bool)>) -> Result<(), UsageError> {
    match input {
        Some((file, false)) => Err(UsageError::InputWithoutGroups(file)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(args: &str) -> Result<PickRequest, UsageError> {
        PickRequest::parse(args.split_whitespace())
    }

    #[test]
    fn groups_attach_to_the_preceding_input() {
        let request = parse("-i a.edj -g Main -g Other -a b.edj -i c.edj -g Extra -o out.edj")
            .unwrap();
        assert_eq!(
            request,
            PickRequest::new("out.edj")
                .include_group("a.edj", "Main")
                .include_group("a.edj", "Other")
                .include_all("b.edj")
                .include_group("c.edj", "Extra")
        );
    }

    #[test]
    fn options_are_parsed() {
        let request =
            parse("--dedupe --compression lzo -n -a a.edj --output out.edj").unwrap();
        assert_eq!(
            request.options,
            PickOptions {
                dedupe: true,
                compression: Compression::Lzo,
                dry_run: true,
            }
        );
        assert_eq!(parse("-a a.edj -o out.edj").unwrap().options, PickOptions::default());
    }

    #[test]
    fn output_is_required() {
        assert!(matches!(parse("-a a.edj"), Err(UsageError::MissingOutput)));
        assert!(matches!(
            PickRequest::parse(["-a", "a.edj", "-o", ""]),
            Err(UsageError::MissingOutput)
        ));
        assert!(matches!(
            parse("-a a.edj -o x.edj -o y.edj"),
            Err(UsageError::DuplicateOutput)
        ));
    }

    #[test]
    fn inclusions_are_required() {
        assert!(matches!(parse("-o out.edj"), Err(UsageError::NoInclusions)));
    }

    #[test]
    fn malformed_inclusions_are_rejected() {
        assert!(matches!(
            parse("-g Main -i a.edj -o out.edj"),
            Err(UsageError::GroupWithoutInput(group)) if group == "Main"
        ));
        assert!(matches!(
            parse("-i a.edj -i b.edj -g Main -o out.edj"),
            Err(UsageError::InputWithoutGroups(file)) if file == PathBuf::from("a.edj")
        ));
        assert!(matches!(
            parse("-o out.edj -i a.edj"),
            Err(UsageError::InputWithoutGroups(_))
        ));
    }

    #[test]
    fn bad_tokens_are_rejected() {
        assert!(matches!(
            parse("-a a.edj -o out.edj --frobnicate"),
            Err(UsageError::UnknownFlag(flag)) if flag == "--frobnicate"
        ));
        assert!(matches!(
            parse("-a a.edj -o out.edj stray.edj"),
            Err(UsageError::UnknownFlag(_))
        ));
        assert!(matches!(
            parse("-a a.edj -o"),
            Err(UsageError::MissingValue(flag)) if flag == "-o"
        ));
        assert!(matches!(
            parse("-a a.edj -o out.edj --compression brotli"),
            Err(UsageError::InvalidCompression(_))
        ));
    }
}
