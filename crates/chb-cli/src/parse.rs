//! Command line model and parse results
//!
//! A [`CommandLine`] wraps a `clap` command together with the mutable
//! invocation configuration. Parsing recognizes directive tokens
//! (`[name:value]`) at the front of the token stream and collects tokens
//! after a `--` separator as unmatched pass-through tokens for the host
//! builder factory.

use std::any::Any;
use std::sync::Arc;

use clap::ArgMatches;

use chb_domain::error::{Error, Result};

use crate::config::CommandLineConfig;

/// One directive and every value seen for it.
///
/// `[config:a=1] [config:b]` yields a single `config` directive with the
/// values `["a=1", "b"]`; `[config]` yields the directive with no values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Directive name as first written
    pub name: String,
    /// Raw value tokens in occurrence order
    pub values: Vec<String>,
}

/// Immutable snapshot of a completed command-line parse.
#[derive(Debug, Clone)]
pub struct ParseResult {
    matches: ArgMatches,
    unmatched: Vec<String>,
    directives: Vec<Directive>,
    config: Arc<CommandLineConfig>,
}

impl ParseResult {
    /// The matched argument values
    pub fn matches(&self) -> &ArgMatches {
        &self.matches
    }

    /// Tokens after the `--` separator, untouched by the parser
    pub fn unmatched(&self) -> &[String] {
        &self.unmatched
    }

    /// Every directive recognized at the front of the token stream
    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Directive by name, matched case-insensitively
    pub fn directive(&self, name: &str) -> Option<&Directive> {
        self.directives
            .iter()
            .find(|directive| directive.name.eq_ignore_ascii_case(name))
    }

    /// The command line's mutable configuration
    pub fn config(&self) -> &CommandLineConfig {
        &self.config
    }

    /// Shared handle to the configuration, for catalog registration
    pub fn config_handle(&self) -> Arc<CommandLineConfig> {
        Arc::clone(&self.config)
    }

    /// Typed value of a matched argument, if one was supplied
    pub fn value_of<T>(&self, id: &str) -> Option<T>
    where
        T: Any + Clone + Send + Sync + 'static,
    {
        self.matches.try_get_one::<T>(id).ok().flatten().cloned()
    }
}

/// A `clap` command plus the mutable invocation configuration.
pub struct CommandLine {
    command: clap::Command,
    config: Arc<CommandLineConfig>,
}

impl CommandLine {
    /// Wrap a `clap` command
    pub fn new(command: clap::Command) -> Self {
        Self {
            command,
            config: Arc::new(CommandLineConfig::new()),
        }
    }

    /// The mutable invocation configuration
    pub fn config(&self) -> &CommandLineConfig {
        &self.config
    }

    /// Disable the termination watchdog up front. Hosted command actions
    /// re-assert this on every invocation, ahead of their first suspension
    /// point.
    pub fn use_hosting(self) -> Self {
        self.config.use_hosting();
        self
    }

    /// Parse an argv-style token stream (first token = binary name).
    ///
    /// Directive tokens are recognized only at the front of the stream,
    /// immediately after the binary name; the first non-directive token ends
    /// directive recognition. Tokens after `--` bypass the parser entirely
    /// and are exposed as unmatched tokens.
    pub fn parse<I, S>(&self, argv: I) -> Result<ParseResult>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens = argv.into_iter().map(Into::into);
        let mut parsed: Vec<String> = Vec::new();
        if let Some(bin_name) = tokens.next() {
            parsed.push(bin_name);
        }

        let mut directives: Vec<Directive> = Vec::new();
        let mut unmatched: Vec<String> = Vec::new();
        let mut in_prefix = true;
        let mut after_separator = false;
        for token in tokens {
            if after_separator {
                unmatched.push(token);
                continue;
            }
            if token == "--" {
                after_separator = true;
                continue;
            }
            if in_prefix {
                if let Some((name, value)) = parse_directive_token(&token) {
                    record_directive(&mut directives, name, value);
                    continue;
                }
                in_prefix = false;
            }
            parsed.push(token);
        }

        let matches = self
            .command
            .clone()
            .try_get_matches_from(parsed)
            .map_err(|err| Error::command_line(err.to_string()))?;

        Ok(ParseResult {
            matches,
            unmatched,
            directives,
            config: Arc::clone(&self.config),
        })
    }
}

/// `[name:value]` or `[name]`, nothing else.
fn parse_directive_token(token: &str) -> Option<(String, Option<String>)> {
    let inner = token.strip_prefix('[')?.strip_suffix(']')?;
    if inner.is_empty() {
        return None;
    }
    match inner.split_once(':') {
        Some((name, value)) if !name.is_empty() => {
            Some((name.to_string(), Some(value.to_string())))
        }
        Some(_) => None,
        None => Some((inner.to_string(), None)),
    }
}

fn record_directive(directives: &mut Vec<Directive>, name: String, value: Option<String>) {
    if let Some(existing) = directives
        .iter_mut()
        .find(|directive| directive.name.eq_ignore_ascii_case(&name))
    {
        existing.values.extend(value);
        return;
    }
    directives.push(Directive {
        name,
        values: value.into_iter().collect(),
    });
}
