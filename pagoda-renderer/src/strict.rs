//! Undefined-variable checks for `{% if %}` / `{% elif %}` conditions.
//!
//! Tera fails on `{{ web.missing }}` but evaluates a bare undefined identifier
//! in a condition as false, so `{% if web.inherent.enabel_tls %}` would drop a
//! section of an inventory without a word. Every such identifier is resolved
//! against the model before rendering.
//!
//! Names bound inside the template (`for` variables, `set`, macro arguments,
//! `loop`) are not model paths and are skipped. `is defined` tests and the
//! `default` filter stay available for keys that are optional on purpose.

use std::collections::HashSet;

use tera::ast::{Expr, ExprVal, LogicOperator, Node};
use tera::Value;

/// The first identifier used as a condition in `nodes` that `data` cannot
/// resolve.
pub(crate) fn undefined_condition(nodes: &[Node], data: &Value) -> Option<String> {
    Checker {
        data,
        locals: Vec::new(),
        globals: HashSet::new(),
    }
    .walk(nodes)
}

struct Checker<'a> {
    data: &'a Value,
    /// Names bound by enclosing `for` loops, macros and local `set`s.
    locals: Vec<String>,
    /// Names bound by `set_global`.
    globals: HashSet<String>,
}

impl Checker<'_> {
    fn walk(&mut self, nodes: &[Node]) -> Option<String> {
        nodes.iter().find_map(|node| self.node(node))
    }

    fn node(&mut self, node: &Node) -> Option<String> {
        match node {
            Node::If(branches, _) => {
                for (_, condition, body) in &branches.conditions {
                    if let Some(missing) = self.condition(condition) {
                        return Some(missing);
                    }
                    if let Some(missing) = self.walk(body) {
                        return Some(missing);
                    }
                }
                branches
                    .otherwise
                    .as_ref()
                    .and_then(|(_, body)| self.walk(body))
            }
            Node::Forloop(_, forloop, _) => {
                let mark = self.locals.len();
                self.locals.extend(forloop.key.iter().cloned());
                self.locals.push(forloop.value.clone());
                let found = self.walk(&forloop.body).or_else(|| {
                    forloop
                        .empty_body
                        .as_deref()
                        .and_then(|body| self.walk(body))
                });
                self.locals.truncate(mark);
                found
            }
            Node::MacroDefinition(_, definition, _) => {
                let mark = self.locals.len();
                self.locals.extend(definition.args.keys().cloned());
                let found = self.walk(&definition.body);
                self.locals.truncate(mark);
                found
            }
            Node::Set(_, set) => {
                if set.global {
                    self.globals.insert(set.key.clone());
                } else {
                    self.locals.push(set.key.clone());
                }
                None
            }
            Node::Block(_, block, _) => self.walk(&block.body),
            Node::FilterSection(_, section, _) => self.walk(&section.body),
            _ => None,
        }
    }

    /// Only bare identifiers, alone or joined by `and` / `or`, are lenient in
    /// Tera; comparisons and function calls already fail on undefined input.
    fn condition(&self, expr: &Expr) -> Option<String> {
        match &expr.val {
            ExprVal::Logic(logic)
                if matches!(logic.operator, LogicOperator::And | LogicOperator::Or) =>
            {
                self.condition(&logic.lhs)
                    .or_else(|| self.condition(&logic.rhs))
            }
            ExprVal::Ident(ident) if !expr.has_default_filter() && !self.resolves(ident) => {
                Some(ident.clone())
            }
            _ => None,
        }
    }

    fn resolves(&self, ident: &str) -> bool {
        // `a.b[c]` is checked up to the first subscript.
        let path = ident.split('[').next().unwrap_or(ident);
        let root = path.split('.').next().unwrap_or(path);
        if root == "loop"
            || root == "__tera_context"
            || self.globals.contains(root)
            || self.locals.iter().any(|local| local == root)
        {
            return true;
        }
        tera::dotted_pointer(self.data, path).is_some()
    }
}
