//! Recursive-descent parser: tokens → spec DAG (spec.md §4.2).
//!
//! ```text
//! spec-list    = { ID spec { DEP ID spec } }
//! spec         = ID { option }
//! option       = AT version-list
//!              | ON  ID                       // +variant
//!              | OFF ID                       // -variant or ~variant
//!              | PCT ID [ AT version-list ]   // compiler with optional versions
//!              | EQ  ID                       // architecture
//! version-list = version { COMMA version }
//! version      = ID | ID COLON | COLON ID | ID COLON ID
//! ```
//!
//! The one context-sensitive rule: ids inside a `version` may contain `.`,
//! ids everywhere else may not. That's enforced by [`check_identifier`]
//! called right after consuming a non-version `ID`, never inside the lexer
//! (spec.md §9 "keep it there").

use crate::compiler::Compiler;
use crate::error::{DuplicateError, IdentifierError, ParseError, SpecError};
use crate::lexer::{lex, Token};
use crate::registry::CompilerRegistry;
use crate::spec::Spec;
use crate::version::{Version, VersionList, VersionRange, VersionTerm};
use log::trace;

/// Parse one or more top-level specs out of `input` (spec.md §4.2).
///
/// `registry` is consulted whenever a `%compiler` clause names a compiler,
/// so that unknown compilers are rejected at parse time rather than later
/// (spec.md §3 invariant).
pub fn parse(input: &str, registry: &dyn CompilerRegistry) -> Result<Vec<Spec>, SpecError> {
    let tokens = lex(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        registry,
    };
    parser.spec_list()
}

/// Parse exactly one spec out of `input`, failing if zero or more than one
/// top-level spec is present (mirrors constructing a `Spec` directly from
/// text, as opposed to a dependency list).
pub fn parse_one(input: &str, registry: &dyn CompilerRegistry) -> Result<Spec, SpecError> {
    let mut specs = parse(input, registry)?;
    match specs.len() {
        1 => Ok(specs.remove(0)),
        0 => Err(SpecError::other("string contains no specs")),
        n => Err(SpecError::other(format!("more than one spec in string ({n} roots)"))),
    }
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    registry: &'a dyn CompilerRegistry,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn accept(&mut self, matches: impl Fn(&Token) -> bool) -> bool {
        if self.peek().is_some_and(&matches) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_id(&mut self, expected: &str) -> Result<String, SpecError> {
        match self.advance() {
            Some(Token::Id(s)) => Ok(s),
            Some(other) => Err(ParseError::UnexpectedToken {
                found: other.describe(),
                expected: expected.to_string(),
            }
            .into()),
            None => Err(ParseError::UnexpectedEof {
                expected: expected.to_string(),
            }
            .into()),
        }
    }

    fn spec_list(&mut self) -> Result<Vec<Spec>, SpecError> {
        let mut specs: Vec<Spec> = Vec::new();

        while let Some(tok) = self.peek() {
            match tok {
                Token::Id(_) => {
                    let name = self.expect_id("package name")?;
                    trace!("parser: root spec '{}'", name);
                    specs.push(self.spec_body(name)?);
                }
                Token::Dep => {
                    self.advance();
                    if specs.is_empty() {
                        return Err(ParseError::DanglingDependency.into());
                    }
                    let name = self.expect_id("dependency package name")?;
                    let dep = self.spec_body(name)?;
                    specs.last_mut().unwrap().add_dependency(dep)?;
                }
                other => {
                    return Err(ParseError::UnexpectedToken {
                        found: other.describe(),
                        expected: "package name or '^'".to_string(),
                    }
                    .into());
                }
            }
        }

        Ok(specs)
    }

    /// Parse the options following an already-consumed package-name `ID`.
    fn spec_body(&mut self, name: String) -> Result<Spec, SpecError> {
        check_identifier(&name)?;
        let mut spec = Spec::new(name);
        let mut added_version = false;

        loop {
            if self.accept(|t| *t == Token::At) {
                for term in self.version_list()? {
                    spec.versions.add(term);
                }
                added_version = true;
            } else if self.accept(|t| *t == Token::On) {
                let variant = self.variant_name()?;
                self.add_variant(&mut spec, variant, true)?;
            } else if self.accept(|t| *t == Token::Off) {
                let variant = self.variant_name()?;
                self.add_variant(&mut spec, variant, false)?;
            } else if self.accept(|t| *t == Token::Pct) {
                let compiler = self.compiler()?;
                if spec.compiler.is_some() {
                    return Err(SpecError::Duplicate(DuplicateError::Compiler {
                        package: spec.name.clone(),
                    }));
                }
                spec.compiler = Some(compiler);
            } else if self.accept(|t| *t == Token::Eq) {
                let arch = self.expect_id("architecture")?;
                check_identifier(&arch)?;
                if spec.architecture.is_some() {
                    return Err(SpecError::Duplicate(DuplicateError::Architecture {
                        package: spec.name.clone(),
                    }));
                }
                spec.architecture = Some(arch);
            } else {
                break;
            }
        }

        // Open-range default (spec.md §4.2): a spec with no @ clause gets
        // the open list `:`, already set by `Spec::new` — nothing to do if
        // `added_version` is false. When `added_version` is true, leave
        // whatever was accumulated, even a single pinned version.
        let _ = added_version;
        Ok(spec)
    }

    fn add_variant(&mut self, spec: &mut Spec, name: String, enabled: bool) -> Result<(), SpecError> {
        check_identifier(&name)?;
        spec.variants
            .insert_new(name.clone(), enabled)
            .map_err(|_| {
                SpecError::Duplicate(DuplicateError::Variant {
                    package: spec.name.clone(),
                    variant: name,
                })
            })
    }

    fn variant_name(&mut self) -> Result<String, SpecError> {
        self.expect_id("variant name")
    }

    fn compiler(&mut self) -> Result<Compiler, SpecError> {
        let name = self.expect_id("compiler name")?;
        check_identifier(&name)?;
        let mut versions = VersionList::new();
        if self.accept(|t| *t == Token::At) {
            for term in self.version_list()? {
                versions.add(term);
            }
        }
        Compiler::new(name, versions, self.registry)
    }

    fn version_list(&mut self) -> Result<Vec<VersionTerm>, SpecError> {
        let mut terms = vec![self.version()?];
        while self.accept(|t| *t == Token::Comma) {
            terms.push(self.version()?);
        }
        Ok(terms)
    }

    fn version(&mut self) -> Result<VersionTerm, SpecError> {
        let start = match self.peek() {
            Some(Token::Id(_)) => match self.advance() {
                Some(Token::Id(s)) => Some(s),
                _ => unreachable!(),
            },
            _ => None,
        };

        if self.accept(|t| *t == Token::Colon) {
            let end = match self.peek() {
                Some(Token::Id(_)) => match self.advance() {
                    Some(Token::Id(s)) => Some(s),
                    _ => unreachable!(),
                },
                _ => None,
            };
            Ok(VersionTerm::Range(VersionRange::new(
                start.map(|s| Version::parse(&s)),
                end.map(|s| Version::parse(&s)),
            )))
        } else if let Some(s) = start {
            Ok(VersionTerm::Exact(Version::parse(&s)))
        } else {
            Err(ParseError::NextTokenError {
                reason: "invalid version specifier".to_string(),
            }
            .into())
        }
    }
}

/// spec.md §4.2: "an ID containing '.' is a parse error" outside of a
/// version context. Called immediately after consuming a variant,
/// architecture, compiler, or package-name `ID`.
fn check_identifier(id: &str) -> Result<(), SpecError> {
    if id.contains('.') {
        return Err(IdentifierError {
            identifier: id.to_string(),
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MockCompilerRegistry;

    fn registry() -> MockCompilerRegistry {
        MockCompilerRegistry::from_names(["gcc", "intel"])
    }

    #[test]
    fn basic_parse() {
        let reg = registry();
        let specs = parse("mpileaks", &reg).unwrap();
        assert_eq!(specs.len(), 1);
        let s = &specs[0];
        assert_eq!(s.name, "mpileaks");
        assert!(s.versions.is_open());
        assert!(s.variants.is_empty());
        assert!(s.compiler.is_none());
        assert!(s.architecture.is_none());
        assert!(s.dependencies.is_empty());
    }

    #[test]
    fn full_syntax() {
        let reg = registry();
        let s = parse_one("mpileaks ^openmpi @1.2:1.4 +debug %intel @12.1", &reg).unwrap();
        assert_eq!(s.name, "mpileaks");
        let dep = s.dependencies.get("openmpi").unwrap();
        assert_eq!(dep.versions.to_string(), "1.2:1.4");
        assert!(dep.variants.get("debug").unwrap().enabled);
        let compiler = dep.compiler.as_ref().unwrap();
        assert_eq!(compiler.name, "intel");
        assert_eq!(compiler.versions.to_string(), "12.1");
    }

    #[test]
    fn open_vs_pinned_version_list() {
        let reg = registry();
        let s = parse_one("foo @1.0,1.2:1.4,1.6:1.8", &reg).unwrap();
        assert_eq!(s.versions.to_string(), "1.0,1.2:1.4,1.6:1.8");
    }

    #[test]
    fn disabled_variant_dash_and_tilde_equal() {
        let reg = registry();
        let a = parse_one("foo -debug", &reg).unwrap();
        let b = parse_one("foo~debug", &reg).unwrap();
        assert_eq!(a, b);
        assert!(!a.variants.get("debug").unwrap().enabled);
    }

    #[test]
    fn duplicate_compiler_rejected() {
        let reg = registry();
        let err = parse_one("foo %gcc %intel", &reg).unwrap_err();
        assert!(matches!(
            err,
            SpecError::Duplicate(DuplicateError::Compiler { .. })
        ));
    }

    #[test]
    fn duplicate_architecture_rejected() {
        let reg = registry();
        let err = parse_one("foo =linux-x86_64 =darwin-arm64", &reg).unwrap_err();
        assert!(matches!(
            err,
            SpecError::Duplicate(DuplicateError::Architecture { .. })
        ));
    }

    #[test]
    fn duplicate_variant_rejected() {
        let reg = registry();
        let err = parse_one("foo +debug +debug", &reg).unwrap_err();
        assert!(matches!(
            err,
            SpecError::Duplicate(DuplicateError::Variant { .. })
        ));
    }

    #[test]
    fn dangling_dependency_is_error() {
        let reg = registry();
        let err = parse("^openmpi", &reg).unwrap_err();
        assert!(matches!(
            err,
            SpecError::Parse(ParseError::DanglingDependency)
        ));
    }

    #[test]
    fn dotted_non_version_identifier_rejected() {
        let reg = registry();
        assert!(parse_one("foo +de.bug", &reg).is_err());
        assert!(parse_one("foo =lin.ux", &reg).is_err());
    }

    #[test]
    fn dotted_version_identifier_allowed() {
        let reg = registry();
        let s = parse_one("foo @1.2.3", &reg).unwrap();
        assert_eq!(s.versions.to_string(), "1.2.3");
    }

    #[test]
    fn unknown_compiler_at_parse_time() {
        let reg = registry();
        let err = parse_one("foo %msvc", &reg).unwrap_err();
        assert!(matches!(err, SpecError::UnknownCompiler { .. }));
    }

    #[test]
    fn multiple_roots_and_dependency_attachment() {
        let reg = registry();
        let specs = parse("mpileaks ^openmpi zlib", &reg).unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name, "mpileaks");
        assert!(specs[0].dependencies.contains("openmpi"));
        assert_eq!(specs[1].name, "zlib");
        assert!(specs[1].dependencies.is_empty());
    }
}
