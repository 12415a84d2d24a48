//! Derive a command-line schema from a Sphinx-style field list.
//!
//! ```text
//! Short description of the command.
//! :param str cmd:     subcommand to run
//! :param list args:   extra arguments
//! :param debug:       enable debug output
//! :type debug:        bool
//! ```
//!
//! Parameters that have a default become `--long` flags, the rest become
//! required positionals.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command, value_parser};
use regex::Regex;

/// Semantic type named by a `:param`/`:type` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    Int,
    Str,
    List,
    Tuple,
    Bytes,
    Bool,
}

impl ArgType {
    /// Map a declared type token; unknown tokens leave the type free-form.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "int" => Some(Self::Int),
            "str" => Some(Self::Str),
            "list" => Some(Self::List),
            "tuple" => Some(Self::Tuple),
            "bytes" => Some(Self::Bytes),
            "bool" => Some(Self::Bool),
            _ => None,
        }
    }

    const fn is_sequence(self) -> bool {
        matches!(self, Self::List | Self::Tuple)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    pub help: String,
    pub ty: Option<ArgType>,
    pub default: Option<String>,
}

impl ParamSpec {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            help: String::new(),
            ty: None,
            default: None,
        }
    }

    /// Parameters without a default are required positionals.
    #[must_use]
    pub const fn is_positional(&self) -> bool {
        self.default.is_none()
    }

    #[must_use]
    pub fn long_flag(&self) -> String {
        self.name.replace('_', "-")
    }

    fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.name.clone()).help(self.help.clone());

        if self.is_positional() {
            arg = match self.ty {
                Some(ty) if ty.is_sequence() => {
                    arg.action(ArgAction::Append).allow_hyphen_values(true)
                }
                Some(ArgType::Int) => arg.required(true).value_parser(value_parser!(i64)),
                Some(ArgType::Bool) => arg.required(true).value_parser(value_parser!(bool)),
                _ => arg.required(true),
            };
            return arg;
        }

        arg = arg.long(self.long_flag());
        let default = self.default.clone().unwrap_or_default();
        match self.ty {
            Some(ArgType::Bool) if default == "true" => arg.action(ArgAction::SetFalse),
            Some(ArgType::Bool) => arg.action(ArgAction::SetTrue),
            Some(ArgType::Int) => arg.value_parser(value_parser!(i64)).default_value(default),
            Some(ty) if ty.is_sequence() => arg.num_args(1..).action(ArgAction::Append),
            _ => arg.default_value(default),
        }
    }
}

/// Schema derived from one documented function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    /// Parameters in declaration order.
    pub params: Vec<ParamSpec>,
}

impl FunctionSpec {
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    fn param_mut(&mut self, name: &str) -> &mut ParamSpec {
        if let Some(i) = self.params.iter().position(|p| p.name == name) {
            return &mut self.params[i];
        }
        self.params.push(ParamSpec::new(name));
        let last = self.params.len() - 1;
        &mut self.params[last]
    }

    /// Build a clap parser with one argument per parameter.
    #[must_use]
    pub fn to_command(&self) -> Command {
        self.params.iter().fold(
            Command::new(self.name.clone()).about(self.description.clone()),
            |cmd, p| cmd.arg(p.to_arg()),
        )
    }
}

/// Build a parser with one subcommand per function, named after it.
/// A subcommand is required.
#[must_use]
pub fn to_subcommands(name: &str, about: &str, specs: &[FunctionSpec]) -> Command {
    specs.iter().fold(
        Command::new(name.to_string())
            .about(about.to_string())
            .subcommand_required(true)
            .arg_required_else_help(true),
        |cmd, spec| cmd.subcommand(spec.to_command()),
    )
}

/// Parse a documentation block and merge in declared default values.
///
/// The description is the text before the first colon, folded onto one line.
/// `:param [type] name: help` declares a parameter (the type may span several
/// words and the help may contain colons); `:type name: type` overrides the
/// type of a declared parameter wherever it appears, and is ignored for names
/// no `:param` declares. A parameter listed in `defaults` becomes optional and its help gains
/// ` (<default>)`.
///
/// # Errors
/// Returns an error only if the field patterns fail to compile.
pub fn parse(name: &str, doc: &str, defaults: &[(&str, &str)]) -> Result<FunctionSpec> {
    let desc_re = Regex::new(r"(?s)^(.*?):").context("description pattern")?;
    let param_re =
        Regex::new(r"^:param\s+(?:(?P<ty>[^\s:][^:]*?)\s+)?(?P<name>[^\s:]+)\s*:(?P<help>.*)$")
            .context("param pattern")?;
    let type_re =
        Regex::new(r"^:type\s+(?P<name>[^\s:]+)\s*:(?P<ty>.*)$").context("type pattern")?;

    let description = desc_re
        .captures(doc)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default();

    let mut spec = FunctionSpec {
        name: name.to_string(),
        description,
        params: Vec::new(),
    };

    // `:type` lines may precede their `:param`, so apply them last
    let mut overrides: Vec<(String, Option<ArgType>)> = Vec::new();

    for line in doc.lines().map(str::trim) {
        if let Some(c) = param_re.captures(line) {
            let param = spec.param_mut(&c["name"]);
            param.help = c["help"].trim().to_string();
            if let Some(ty) = c.name("ty") {
                param.ty = ArgType::from_token(ty.as_str());
            }
            if let Some((_, value)) = defaults.iter().find(|(n, _)| *n == param.name) {
                param.default = Some((*value).to_string());
                param.help = format!("{} ({value})", param.help).trim_start().to_string();
            }
        } else if let Some(c) = type_re.captures(line) {
            overrides.push((c["name"].to_string(), ArgType::from_token(&c["ty"])));
        }
    }

    // Undeclared names are ignored
    for (name, ty) in overrides {
        if let Some(param) = spec.params.iter_mut().find(|p| p.name == name) {
            param.ty = ty;
        }
    }

    Ok(spec)
}
