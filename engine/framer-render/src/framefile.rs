use crate::overrides::OverrideStore;
use framer_protocol::{Roleset, RolesetMap};
use std::collections::BTreeMap;
use std::fmt;

pub const EXAMPLE_SEPARATOR: &str = "**********";
pub const ROLESET_SEPARATOR: &str = "--------------------------------------------------";
pub const EXAMPLES_HEADING: &str = "---Exemplos de sentenças---";

/// Where the framefile is going. Only the indentation of role and argument lines differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    File,
    Console,
}

impl Layout {
    fn indent(self) -> &'static str {
        match self {
            Layout::File => "\t\t",
            Layout::Console => "\t",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions<'a> {
    pub verb: &'a str,
    pub layout: Layout,
}

/// Default export file name for `verb`.
pub fn framefile_name(verb: &str) -> String {
    format!("Framefile-{}-v.txt", verb)
}

/// Renders the active part of `map` with `overrides` applied. Pure.
pub fn render_framefile(map: &RolesetMap, overrides: &OverrideStore, options: RenderOptions<'_>) -> String {
    Framefile {
        map,
        overrides,
        options,
    }
    .to_string()
}

struct Framefile<'a> {
    map: &'a RolesetMap,
    overrides: &'a OverrideStore,
    options: RenderOptions<'a>,
}

impl fmt::Display for Framefile<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Verbo analisado: {}", self.options.verb)?;
        writeln!(f)?;

        for roleset in self.overrides.active_rolesets(self.map) {
            self.roleset(f, roleset)?;
        }
        Ok(())
    }
}

impl Framefile<'_> {
    fn roleset(&self, f: &mut fmt::Formatter<'_>, roleset: &Roleset) -> fmt::Result {
        let indent = self.options.layout.indent();

        writeln!(f, "Roleset ID: {}", roleset.id)?;
        writeln!(f, "Roles:")?;
        let roles = self.overrides.effective_roles(roleset);
        if roles.is_empty() {
            writeln!(f, "{}-", indent)?;
        }
        for role in &roles {
            writeln!(f, "{}{}", indent, role)?;
        }

        writeln!(f)?;
        writeln!(f, "Descrição: {}", self.overrides.description(roleset.id))?;
        writeln!(f)?;
        writeln!(f, "{}", EXAMPLES_HEADING)?;
        writeln!(f)?;

        for (index, example) in roleset.examples.iter().enumerate() {
            if self.overrides.is_example_removed(roleset.id, index) {
                continue;
            }

            writeln!(f, "\t{}", example.sentence)?;
            writeln!(f)?;
            match self.overrides.arguments(roleset.id, index) {
                Some(edited) => {
                    for (label, value) in edited {
                        writeln!(f, "{}{}: {}", indent, label, value)?;
                    }
                }
                None => {
                    for (label, value) in ordered_arguments(&example.arguments) {
                        writeln!(f, "{}{}: {}", indent, label, value)?;
                    }
                }
            }
            writeln!(f, "{}", EXAMPLE_SEPARATOR)?;
        }

        writeln!(f, "{}", ROLESET_SEPARATOR)
    }
}

/// Numbered roles first (Arg0, Arg1, ..., Arg10), then everything else by label.
fn ordered_arguments(arguments: &BTreeMap<String, String>) -> Vec<(&String, &String)> {
    let mut ordered: Vec<(&String, &String)> = arguments.iter().collect();
    ordered.sort_by_key(|(label, _)| {
        let number = core_number(label);
        (number.is_none(), number.unwrap_or(0), label.as_str())
    });
    ordered
}

fn core_number(label: &str) -> Option<u64> {
    let rest = label.get(3..)?;
    if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    rest.parse().ok()
}
