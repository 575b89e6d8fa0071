//! Single-pass fact collection over a parsed module.
//!
//! The walk is flow- and scope-insensitive: every name lives in one flat
//! namespace per file. Rules only ever see the facts gathered here.

use crate::source::LineIndex;
use rustpython_ast::{
    Arguments, Comprehension, Constant, ExceptHandler, Expr, ExprContext, Mod, Operator, Pattern,
    Stmt,
};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Parameter and divisor knowledge about one function name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionFacts {
    /// Positional parameters in declaration order
    pub params: Vec<String>,
    /// Parameters observed as the right operand of a division
    pub divisor_params: BTreeSet<String>,
}

/// Shape of a positional call argument, as far as the rules care
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgShape {
    ZeroLiteral,
    BinaryOp,
    Starred,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub line: usize,
    /// Bare name or trailing attribute name of the callee
    pub callee: Option<String>,
    /// True when the callee is a plain name (`f(...)`, not `obj.f(...)`)
    pub bare_name: bool,
    pub args: Vec<ArgShape>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDefSite {
    pub name: String,
    pub line: usize,
}

/// Everything the rule engine learned from one walk
#[derive(Debug, Default)]
pub struct ModuleFacts {
    pub assigned_names: BTreeSet<String>,
    pub used_names: HashSet<String>,
    pub magic_number_lines: BTreeSet<usize>,
    pub calls: Vec<CallSite>,
    pub functions: BTreeMap<String, FunctionFacts>,
    pub function_defs: Vec<FunctionDefSite>,
}

impl ModuleFacts {
    /// Walk `ast` once and collect facts
    pub fn collect(ast: &Mod, source: &str) -> Self {
        let mut collector = FactCollector::new(source);
        if let Mod::Module(module) = ast {
            collector.visit_body(&module.body);
        }
        collector.facts
    }
}

/// Tree walker that fills [`ModuleFacts`]
pub struct FactCollector {
    lines: LineIndex,
    facts: ModuleFacts,
    /// Enclosing function names with their parameters, innermost last
    function_stack: Vec<(String, Vec<String>)>,
}

impl FactCollector {
    pub fn new(source: &str) -> Self {
        Self {
            lines: LineIndex::new(source),
            facts: ModuleFacts::default(),
            function_stack: Vec::new(),
        }
    }

    fn line(&self, offset: usize) -> usize {
        self.lines.line_of(offset)
    }

    pub fn visit_body(&mut self, body: &[Stmt]) {
        for stmt in body {
            self.visit_stmt(stmt);
        }
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::FunctionDef(func) => {
                let line = self.line(func.range.start().to_usize());
                self.visit_function(
                    func.name.as_str(),
                    line,
                    &func.args,
                    &func.decorator_list,
                    func.returns.as_deref(),
                    &func.body,
                );
            }
            Stmt::AsyncFunctionDef(func) => {
                let line = self.line(func.range.start().to_usize());
                self.visit_function(
                    func.name.as_str(),
                    line,
                    &func.args,
                    &func.decorator_list,
                    func.returns.as_deref(),
                    &func.body,
                );
            }
            Stmt::ClassDef(class_def) => {
                self.visit_exprs(&class_def.decorator_list);
                self.visit_exprs(&class_def.bases);
                for keyword in &class_def.keywords {
                    self.visit_expr(&keyword.value);
                }
                self.visit_body(&class_def.body);
            }
            Stmt::Return(ret) => {
                if let Some(value) = &ret.value {
                    self.visit_expr(value);
                }
            }
            Stmt::Delete(delete) => self.visit_exprs(&delete.targets),
            Stmt::Assign(assign) => {
                for target in &assign.targets {
                    if let Expr::Name(name) = target {
                        self.facts.assigned_names.insert(name.id.to_string());
                    }
                    self.visit_expr(target);
                }
                self.visit_expr(&assign.value);
            }
            Stmt::AugAssign(aug) => {
                if is_division(&aug.op) {
                    if let Expr::Name(name) = &*aug.value {
                        self.record_divisor(name.id.as_str());
                    }
                }
                self.visit_expr(&aug.target);
                self.visit_expr(&aug.value);
            }
            Stmt::AnnAssign(ann) => {
                self.visit_expr(&ann.target);
                self.visit_expr(&ann.annotation);
                if let Some(value) = &ann.value {
                    self.visit_expr(value);
                }
            }
            Stmt::For(for_stmt) => {
                self.visit_expr(&for_stmt.target);
                self.visit_expr(&for_stmt.iter);
                self.visit_body(&for_stmt.body);
                self.visit_body(&for_stmt.orelse);
            }
            Stmt::AsyncFor(for_stmt) => {
                self.visit_expr(&for_stmt.target);
                self.visit_expr(&for_stmt.iter);
                self.visit_body(&for_stmt.body);
                self.visit_body(&for_stmt.orelse);
            }
            Stmt::While(while_stmt) => {
                self.visit_expr(&while_stmt.test);
                self.visit_body(&while_stmt.body);
                self.visit_body(&while_stmt.orelse);
            }
            Stmt::If(if_stmt) => {
                self.visit_expr(&if_stmt.test);
                self.visit_body(&if_stmt.body);
                self.visit_body(&if_stmt.orelse);
            }
            Stmt::With(with_stmt) => {
                for item in &with_stmt.items {
                    self.visit_expr(&item.context_expr);
                    if let Some(vars) = &item.optional_vars {
                        self.visit_expr(vars);
                    }
                }
                self.visit_body(&with_stmt.body);
            }
            Stmt::AsyncWith(with_stmt) => {
                for item in &with_stmt.items {
                    self.visit_expr(&item.context_expr);
                    if let Some(vars) = &item.optional_vars {
                        self.visit_expr(vars);
                    }
                }
                self.visit_body(&with_stmt.body);
            }
            Stmt::Match(match_stmt) => {
                self.visit_expr(&match_stmt.subject);
                for case in &match_stmt.cases {
                    self.visit_pattern(&case.pattern);
                    if let Some(guard) = &case.guard {
                        self.visit_expr(guard);
                    }
                    self.visit_body(&case.body);
                }
            }
            Stmt::Raise(raise) => {
                if let Some(exc) = &raise.exc {
                    self.visit_expr(exc);
                }
                if let Some(cause) = &raise.cause {
                    self.visit_expr(cause);
                }
            }
            Stmt::Try(try_stmt) => {
                self.visit_body(&try_stmt.body);
                self.visit_handlers(&try_stmt.handlers);
                self.visit_body(&try_stmt.orelse);
                self.visit_body(&try_stmt.finalbody);
            }
            Stmt::TryStar(try_stmt) => {
                self.visit_body(&try_stmt.body);
                self.visit_handlers(&try_stmt.handlers);
                self.visit_body(&try_stmt.orelse);
                self.visit_body(&try_stmt.finalbody);
            }
            Stmt::Assert(assert) => {
                self.visit_expr(&assert.test);
                if let Some(msg) = &assert.msg {
                    self.visit_expr(msg);
                }
            }
            Stmt::Expr(expr_stmt) => self.visit_expr(&expr_stmt.value),
            _ => {}
        }
    }

    fn visit_pattern(&mut self, pattern: &Pattern) {
        match pattern {
            Pattern::MatchValue(p) => self.visit_expr(&p.value),
            Pattern::MatchSequence(p) => self.visit_patterns(&p.patterns),
            Pattern::MatchMapping(p) => {
                self.visit_exprs(&p.keys);
                self.visit_patterns(&p.patterns);
            }
            Pattern::MatchClass(p) => {
                self.visit_expr(&p.cls);
                self.visit_patterns(&p.patterns);
                self.visit_patterns(&p.kwd_patterns);
            }
            Pattern::MatchAs(p) => {
                if let Some(inner) = &p.pattern {
                    self.visit_pattern(inner);
                }
            }
            Pattern::MatchOr(p) => self.visit_patterns(&p.patterns),
            Pattern::MatchSingleton(_) | Pattern::MatchStar(_) => {}
        }
    }

    fn visit_patterns(&mut self, patterns: &[Pattern]) {
        for pattern in patterns {
            self.visit_pattern(pattern);
        }
    }

    fn visit_handlers(&mut self, handlers: &[ExceptHandler]) {
        for handler in handlers {
            if let ExceptHandler::ExceptHandler(h) = handler {
                if let Some(type_) = &h.type_ {
                    self.visit_expr(type_);
                }
                self.visit_body(&h.body);
            }
        }
    }

    fn visit_function(
        &mut self,
        name: &str,
        line: usize,
        args: &Arguments,
        decorators: &[Expr],
        returns: Option<&Expr>,
        body: &[Stmt],
    ) {
        self.facts.function_defs.push(FunctionDefSite {
            name: name.to_string(),
            line,
        });

        self.visit_exprs(decorators);
        self.visit_arguments(args);
        if let Some(returns) = returns {
            self.visit_expr(returns);
        }

        let params: Vec<String> = args
            .posonlyargs
            .iter()
            .chain(args.args.iter())
            .map(|arg| arg.def.arg.to_string())
            .collect();

        // a later definition with the same name replaces the parameter list
        // but keeps divisor knowledge from earlier ones
        self.facts
            .functions
            .entry(name.to_string())
            .or_default()
            .params = params.clone();

        self.function_stack.push((name.to_string(), params));
        self.visit_body(body);
        self.function_stack.pop();
    }

    fn visit_arguments(&mut self, args: &Arguments) {
        let all = args
            .posonlyargs
            .iter()
            .chain(args.args.iter())
            .chain(args.kwonlyargs.iter());
        for arg in all {
            if let Some(annotation) = &arg.def.annotation {
                self.visit_expr(annotation);
            }
            if let Some(default) = &arg.default {
                self.visit_expr(default);
            }
        }
        for arg in args.vararg.iter().chain(args.kwarg.iter()) {
            if let Some(annotation) = &arg.annotation {
                self.visit_expr(annotation);
            }
        }
    }

    /// Credit every enclosing function that declares `name` as a parameter
    fn record_divisor(&mut self, name: &str) {
        for (func_name, params) in &self.function_stack {
            if params.iter().any(|p| p == name) {
                self.facts
                    .functions
                    .entry(func_name.clone())
                    .or_default()
                    .divisor_params
                    .insert(name.to_string());
            }
        }
    }

    fn visit_exprs(&mut self, exprs: &[Expr]) {
        for expr in exprs {
            self.visit_expr(expr);
        }
    }

    fn visit_comprehensions(&mut self, generators: &[Comprehension]) {
        for generator in generators {
            self.visit_expr(&generator.target);
            self.visit_expr(&generator.iter);
            self.visit_exprs(&generator.ifs);
        }
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Name(name) => {
                if matches!(name.ctx, ExprContext::Load) {
                    self.facts.used_names.insert(name.id.to_string());
                }
            }
            Expr::Constant(constant) => {
                if is_magic_number(&constant.value) {
                    let line = self.line(constant.range.start().to_usize());
                    self.facts.magic_number_lines.insert(line);
                }
            }
            Expr::Call(call) => {
                let line = self.line(call.range.start().to_usize());
                let (callee, bare_name) = match &*call.func {
                    Expr::Name(name) => (Some(name.id.to_string()), true),
                    Expr::Attribute(attr) => (Some(attr.attr.to_string()), false),
                    _ => (None, false),
                };
                let args = call.args.iter().map(arg_shape).collect();
                self.facts.calls.push(CallSite {
                    line,
                    callee,
                    bare_name,
                    args,
                });

                self.visit_expr(&call.func);
                self.visit_exprs(&call.args);
                for keyword in &call.keywords {
                    self.visit_expr(&keyword.value);
                }
            }
            Expr::BinOp(bin) => {
                if is_division(&bin.op) {
                    if let Expr::Name(name) = &*bin.right {
                        self.record_divisor(name.id.as_str());
                    }
                }
                self.visit_expr(&bin.left);
                self.visit_expr(&bin.right);
            }
            Expr::BoolOp(bool_op) => self.visit_exprs(&bool_op.values),
            Expr::NamedExpr(named) => {
                self.visit_expr(&named.target);
                self.visit_expr(&named.value);
            }
            Expr::UnaryOp(unary) => self.visit_expr(&unary.operand),
            Expr::Lambda(lambda) => {
                self.visit_arguments(&lambda.args);
                self.visit_expr(&lambda.body);
            }
            Expr::IfExp(if_exp) => {
                self.visit_expr(&if_exp.test);
                self.visit_expr(&if_exp.body);
                self.visit_expr(&if_exp.orelse);
            }
            Expr::Dict(dict) => {
                for key in dict.keys.iter().flatten() {
                    self.visit_expr(key);
                }
                self.visit_exprs(&dict.values);
            }
            Expr::Set(set) => self.visit_exprs(&set.elts),
            Expr::ListComp(comp) => {
                self.visit_expr(&comp.elt);
                self.visit_comprehensions(&comp.generators);
            }
            Expr::SetComp(comp) => {
                self.visit_expr(&comp.elt);
                self.visit_comprehensions(&comp.generators);
            }
            Expr::DictComp(comp) => {
                self.visit_expr(&comp.key);
                self.visit_expr(&comp.value);
                self.visit_comprehensions(&comp.generators);
            }
            Expr::GeneratorExp(comp) => {
                self.visit_expr(&comp.elt);
                self.visit_comprehensions(&comp.generators);
            }
            Expr::Await(await_expr) => self.visit_expr(&await_expr.value),
            Expr::Yield(yield_expr) => {
                if let Some(value) = &yield_expr.value {
                    self.visit_expr(value);
                }
            }
            Expr::YieldFrom(yield_from) => self.visit_expr(&yield_from.value),
            Expr::Compare(compare) => {
                self.visit_expr(&compare.left);
                self.visit_exprs(&compare.comparators);
            }
            Expr::FormattedValue(formatted) => {
                self.visit_expr(&formatted.value);
                if let Some(spec) = &formatted.format_spec {
                    self.visit_expr(spec);
                }
            }
            Expr::JoinedStr(joined) => self.visit_exprs(&joined.values),
            Expr::Attribute(attr) => self.visit_expr(&attr.value),
            Expr::Subscript(subscript) => {
                self.visit_expr(&subscript.value);
                self.visit_expr(&subscript.slice);
            }
            Expr::Starred(starred) => self.visit_expr(&starred.value),
            Expr::List(list) => self.visit_exprs(&list.elts),
            Expr::Tuple(tuple) => self.visit_exprs(&tuple.elts),
            Expr::Slice(slice) => {
                for part in [&slice.lower, &slice.upper, &slice.step].into_iter().flatten() {
                    self.visit_expr(part);
                }
            }
            #[allow(unreachable_patterns)]
            _ => {}
        }
    }
}

fn is_division(op: &Operator) -> bool {
    matches!(op, Operator::Div | Operator::FloorDiv | Operator::Mod)
}

/// Numeric literal outside {0, 1, -1}; booleans never count
fn is_magic_number(value: &Constant) -> bool {
    match value {
        Constant::Int(i) => {
            let text = i.to_string();
            text != "0" && text != "1" && text != "-1"
        }
        Constant::Float(f) => *f != 0.0 && *f != 1.0 && *f != -1.0,
        Constant::Complex { real, imag } => !(*imag == 0.0 && (*real == 0.0 || real.abs() == 1.0)),
        _ => false,
    }
}

fn arg_shape(arg: &Expr) -> ArgShape {
    match arg {
        Expr::Constant(constant) => match &constant.value {
            Constant::Int(i) if i.to_string() == "0" => ArgShape::ZeroLiteral,
            Constant::Float(f) if *f == 0.0 => ArgShape::ZeroLiteral,
            _ => ArgShape::Other,
        },
        Expr::BinOp(_) => ArgShape::BinaryOp,
        Expr::Starred(_) => ArgShape::Starred,
        _ => ArgShape::Other,
    }
}
