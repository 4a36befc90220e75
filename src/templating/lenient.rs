//! Non-strict rendering by rewriting the parsed template.
//!
//! Tera fails on every undefined lookup. For non-strict templates each variable
//! reference without a `default` filter of its own gets one, so an undefined
//! name evaluates to an empty value while the context stays untouched. Explicit
//! `default` filters, `is defined` tests and conditions therefore see the same
//! context the caller passed in.
//!
//! The empty value depends on where the reference appears: an empty string in
//! output and expressions, an empty array as a `for` container, and an empty
//! object as a `for key, value` container.

use std::collections::HashMap;

use tera::ast::{Expr, ExprVal, FunctionCall, Node};
use tera::{Map, Template, Tera, Value};

/// Tera's context dump variable, which is always defined.
const CONTEXT_DUMP_VAR: &str = "__tera_context";

/// Function registered on lenient engines that yields an empty object.
const EMPTY_MAP_FUNCTION: &str = "__renderfs_empty_map";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fallback {
    String,
    List,
    Map,
}

impl Fallback {
    fn expr(self) -> Expr {
        match self {
            Fallback::String => Expr::new(ExprVal::String(String::new())),
            Fallback::List => Expr::new(ExprVal::Array(Vec::new())),
            Fallback::Map => Expr::new(ExprVal::FunctionCall(FunctionCall {
                name: EMPTY_MAP_FUNCTION.to_string(),
                args: HashMap::new(),
            })),
        }
    }

    fn filter(self) -> FunctionCall {
        let mut args = HashMap::new();
        args.insert("value".to_string(), self.expr());
        FunctionCall {
            name: "default".to_string(),
            args,
        }
    }
}

/// Prepare `engine` for lenient rendering of the template registered as `name`.
///
/// Does nothing when no such template exists.
pub(crate) fn relax(engine: &mut Tera, name: &str) {
    engine.register_function(EMPTY_MAP_FUNCTION, |_: &HashMap<String, Value>| {
        Ok(Value::Object(Map::new()))
    });
    if let Some(template) = engine.templates.get_mut(name) {
        relax_template(template);
    }
}

fn relax_template(template: &mut Template) {
    relax_nodes(&mut template.ast);
    for definition in template.macros.values_mut() {
        relax_nodes(&mut definition.body);
    }
    for block in template.blocks.values_mut() {
        relax_nodes(&mut block.body);
    }
    for chain in template.blocks_definitions.values_mut() {
        for (_, block) in chain {
            relax_nodes(&mut block.body);
        }
    }
}

fn relax_nodes(nodes: &mut [Node]) {
    for node in nodes {
        relax_node(node);
    }
}

fn relax_node(node: &mut Node) {
    match node {
        Node::VariableBlock(_, expr) => relax_expr(expr, Fallback::String),
        Node::Set(_, set) => relax_expr(&mut set.value, Fallback::String),
        Node::FilterSection(_, section, _) => {
            relax_args(&mut section.filter.args);
            relax_nodes(&mut section.body);
        }
        Node::Block(_, block, _) => relax_nodes(&mut block.body),
        Node::MacroDefinition(_, definition, _) => relax_nodes(&mut definition.body),
        Node::Forloop(_, forloop, _) => {
            let fallback = if forloop.key.is_some() { Fallback::Map } else { Fallback::List };
            relax_expr(&mut forloop.container, fallback);
            relax_nodes(&mut forloop.body);
            if let Some(body) = &mut forloop.empty_body {
                relax_nodes(body);
            }
        }
        Node::If(branches, _) => {
            for (_, condition, body) in &mut branches.conditions {
                relax_expr(condition, Fallback::String);
                relax_nodes(body);
            }
            if let Some((_, body)) = &mut branches.otherwise {
                relax_nodes(body);
            }
        }
        _ => {}
    }
}

fn relax_expr(expr: &mut Expr, fallback: Fallback) {
    match &mut expr.val {
        ExprVal::Math(math) => {
            relax_expr(&mut math.lhs, Fallback::String);
            relax_expr(&mut math.rhs, Fallback::String);
        }
        ExprVal::Logic(logic) => {
            relax_expr(&mut logic.lhs, Fallback::String);
            relax_expr(&mut logic.rhs, Fallback::String);
        }
        ExprVal::In(condition) => {
            relax_expr(&mut condition.lhs, Fallback::String);
            relax_expr(&mut condition.rhs, Fallback::String);
        }
        ExprVal::Array(items) => {
            for item in items {
                relax_expr(item, Fallback::String);
            }
        }
        ExprVal::FunctionCall(call) => relax_args(&mut call.args),
        ExprVal::MacroCall(call) => relax_args(&mut call.args),
        ExprVal::Test(test) => {
            for arg in &mut test.args {
                relax_expr(arg, Fallback::String);
            }
        }
        _ => {}
    }

    for filter in &mut expr.filters {
        relax_args(&mut filter.args);
    }

    let relaxable = matches!(&expr.val, ExprVal::Ident(name) if name != CONTEXT_DUMP_VAR);
    if relaxable && !expr.has_default_filter() {
        expr.filters.insert(0, fallback.filter());
    }
}

fn relax_args(args: &mut HashMap<String, Expr>) {
    for value in args.values_mut() {
        relax_expr(value, Fallback::String);
    }
}
