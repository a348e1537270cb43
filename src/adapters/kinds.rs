//! Per-language grammar production tables.
//!
//! Shared by the language adapters, the paradigm detector and the structure
//! metrics. C has a table but no adapter; it only feeds CST-level detectors.

use crate::core::Language;

/// Grammar production names grouped by role.
#[derive(Debug)]
pub struct NodeKinds {
    pub functions: &'static [&'static str],
    pub lambdas: &'static [&'static str],
    pub classes: &'static [&'static str],
    /// Ancestors that turn a function into a method
    pub method_scopes: &'static [&'static str],
    pub inheritance: &'static [&'static str],
    pub loops: &'static [&'static str],
    pub conditionals: &'static [&'static str],
    /// Extra decision points: case labels, catch clauses, elif
    pub branches: &'static [&'static str],
    pub calls: &'static [&'static str],
    pub returns: &'static [&'static str],
    pub breaks: &'static [&'static str],
    pub continues: &'static [&'static str],
    pub allocations: &'static [&'static str],
    pub assignments: &'static [&'static str],
    pub updates: &'static [&'static str],
    pub declarations: &'static [&'static str],
    pub expressions: &'static [&'static str],
    pub imports: &'static [&'static str],
    pub comments: &'static [&'static str],
}

impl NodeKinds {
    pub fn is_function(&self, kind: &str) -> bool {
        self.functions.contains(&kind)
    }

    pub fn is_loop(&self, kind: &str) -> bool {
        self.loops.contains(&kind)
    }

    pub fn is_conditional(&self, kind: &str) -> bool {
        self.conditionals.contains(&kind)
    }

    pub fn is_class(&self, kind: &str) -> bool {
        self.classes.contains(&kind)
    }

    pub fn is_mutation(&self, kind: &str) -> bool {
        self.assignments.contains(&kind) || self.updates.contains(&kind)
    }
}

pub static JAVASCRIPT: NodeKinds = NodeKinds {
    functions: &[
        "function_declaration",
        "function_expression",
        "function",
        "arrow_function",
        "method_definition",
        "generator_function_declaration",
        "generator_function",
    ],
    lambdas: &["arrow_function", "function_expression", "function"],
    classes: &["class_declaration", "class", "abstract_class_declaration"],
    method_scopes: &["class_body"],
    inheritance: &["class_heritage"],
    loops: &[
        "for_statement",
        "for_in_statement",
        "while_statement",
        "do_statement",
    ],
    conditionals: &["if_statement", "switch_statement", "ternary_expression"],
    branches: &["switch_case", "catch_clause"],
    calls: &["call_expression"],
    returns: &["return_statement"],
    breaks: &["break_statement"],
    continues: &["continue_statement"],
    allocations: &["array", "object", "new_expression"],
    assignments: &["assignment_expression", "augmented_assignment_expression"],
    updates: &["update_expression"],
    declarations: &["lexical_declaration", "variable_declaration"],
    expressions: &["expression_statement"],
    imports: &["import_statement"],
    comments: &["comment"],
};

pub static PYTHON: NodeKinds = NodeKinds {
    functions: &["function_definition", "lambda"],
    lambdas: &["lambda"],
    classes: &["class_definition"],
    method_scopes: &["class_definition"],
    inheritance: &[],
    loops: &["for_statement", "while_statement", "for_in_clause"],
    conditionals: &["if_statement", "conditional_expression", "match_statement"],
    branches: &["elif_clause", "except_clause", "case_clause"],
    calls: &["call"],
    returns: &["return_statement"],
    breaks: &["break_statement"],
    continues: &["continue_statement"],
    allocations: &[
        "list",
        "dictionary",
        "set",
        "list_comprehension",
        "dictionary_comprehension",
        "set_comprehension",
    ],
    assignments: &["assignment", "augmented_assignment"],
    updates: &[],
    declarations: &["global_statement", "nonlocal_statement"],
    expressions: &["expression_statement"],
    imports: &["import_statement", "import_from_statement"],
    comments: &["comment"],
};

pub static GO: NodeKinds = NodeKinds {
    functions: &["function_declaration", "method_declaration", "func_literal"],
    lambdas: &["func_literal"],
    classes: &["struct_type", "interface_type"],
    method_scopes: &[],
    inheritance: &[],
    loops: &["for_statement"],
    conditionals: &[
        "if_statement",
        "expression_switch_statement",
        "type_switch_statement",
        "select_statement",
    ],
    branches: &["expression_case", "type_case", "communication_case"],
    calls: &["call_expression"],
    returns: &["return_statement"],
    breaks: &["break_statement"],
    continues: &["continue_statement"],
    allocations: &["composite_literal"],
    assignments: &["assignment_statement"],
    updates: &["inc_statement", "dec_statement"],
    declarations: &["short_var_declaration", "var_declaration", "const_declaration"],
    expressions: &["expression_statement"],
    imports: &["import_declaration"],
    comments: &["comment"],
};

pub static JAVA: NodeKinds = NodeKinds {
    functions: &[
        "method_declaration",
        "constructor_declaration",
        "lambda_expression",
    ],
    lambdas: &["lambda_expression"],
    classes: &[
        "class_declaration",
        "interface_declaration",
        "enum_declaration",
        "record_declaration",
    ],
    method_scopes: &["class_body", "interface_body", "enum_body"],
    inheritance: &["superclass", "super_interfaces"],
    loops: &[
        "for_statement",
        "enhanced_for_statement",
        "while_statement",
        "do_statement",
    ],
    conditionals: &[
        "if_statement",
        "switch_expression",
        "switch_statement",
        "ternary_expression",
    ],
    branches: &["switch_label", "catch_clause"],
    calls: &["method_invocation"],
    returns: &["return_statement"],
    breaks: &["break_statement"],
    continues: &["continue_statement"],
    allocations: &[
        "array_creation_expression",
        "object_creation_expression",
        "array_initializer",
    ],
    assignments: &["assignment_expression"],
    updates: &["update_expression"],
    declarations: &["local_variable_declaration", "field_declaration"],
    expressions: &["expression_statement"],
    imports: &["import_declaration"],
    comments: &["line_comment", "block_comment"],
};

pub static RUST: NodeKinds = NodeKinds {
    functions: &["function_item", "closure_expression"],
    lambdas: &["closure_expression"],
    classes: &["struct_item", "trait_item"],
    method_scopes: &["impl_item", "trait_item"],
    inheritance: &[],
    loops: &["for_expression", "while_expression", "loop_expression"],
    conditionals: &["if_expression", "match_expression"],
    branches: &["match_arm", "try_expression"],
    calls: &["call_expression", "macro_invocation"],
    returns: &["return_expression"],
    breaks: &["break_expression"],
    continues: &["continue_expression"],
    allocations: &["array_expression"],
    assignments: &["assignment_expression", "compound_assignment_expr"],
    updates: &[],
    declarations: &["let_declaration"],
    expressions: &["expression_statement"],
    imports: &["use_declaration", "extern_crate_declaration"],
    comments: &["line_comment", "block_comment"],
};

pub static C: NodeKinds = NodeKinds {
    functions: &["function_definition"],
    lambdas: &[],
    classes: &["struct_specifier"],
    method_scopes: &[],
    inheritance: &[],
    loops: &["for_statement", "while_statement", "do_statement"],
    conditionals: &["if_statement", "switch_statement", "conditional_expression"],
    branches: &["case_statement"],
    calls: &["call_expression"],
    returns: &["return_statement"],
    breaks: &["break_statement"],
    continues: &["continue_statement"],
    allocations: &["initializer_list"],
    assignments: &["assignment_expression"],
    updates: &["update_expression"],
    declarations: &["declaration"],
    expressions: &["expression_statement"],
    imports: &["preproc_include"],
    comments: &["comment"],
};

/// Table for a language with a bundled grammar.
pub fn node_kinds(language: Language) -> Option<&'static NodeKinds> {
    match language {
        Language::JavaScript | Language::TypeScript => Some(&JAVASCRIPT),
        Language::Python => Some(&PYTHON),
        Language::Go => Some(&GO),
        Language::Java => Some(&JAVA),
        Language::Rust => Some(&RUST),
        Language::C => Some(&C),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_grammar_language_has_a_table() {
        for lang in [
            Language::JavaScript,
            Language::TypeScript,
            Language::Python,
            Language::Go,
            Language::Java,
            Language::Rust,
            Language::C,
        ] {
            assert!(node_kinds(lang).is_some(), "missing table for {lang}");
        }
        assert!(node_kinds(Language::Php).is_none());
    }

    #[test]
    fn test_lambdas_are_functions() {
        for lang in Language::ALL {
            if let Some(kinds) = node_kinds(lang) {
                for lambda in kinds.lambdas {
                    assert!(kinds.is_function(lambda), "{lambda} not a function in {lang}");
                }
            }
        }
    }
}
