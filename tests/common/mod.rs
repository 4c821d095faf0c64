//! Shared helpers for the integration tests: an engine runner and a small
//! interpreter that records what a tree observably does.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};

use recast::recast_ir::fixture::TreeFixture;
use recast::recast_ir::printer::print_node;
use recast::recast_ir::validation::validate_tree;
use recast::recast_ir::{InfixOp, Literal, NodeKind, NodeRef, PrefixOp, TreeContext, TypeDescriptor};
use recast::{CompilationUnit, Engine, EngineConfig, UnitReport};

/// Install a fmt subscriber that honours `RUST_LOG` and writes through the
/// test harness. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn set_type() -> TypeDescriptor {
    TypeDescriptor::class("java.util.HashSet")
        .with_supertypes(["java.util.Set", "java.util.Collection"])
}

pub fn list_type() -> TypeDescriptor {
    TypeDescriptor::class("java.util.ArrayList")
        .with_supertypes(["java.util.List", "java.util.Collection"])
}

/// Wrap `stmts` in a unit and hand back the context with it.
pub fn unit_of(mut fx: TreeFixture, stmts: Vec<NodeRef>) -> CompilationUnit {
    let root = fx
        .ctx
        .unit(stmts.into_iter().map(Into::into).collect());
    CompilationUnit::new(fx.ctx, root)
}

/// Run the default engine over `unit`, check the tree is still well formed,
/// and print it.
pub fn rewrite(unit: &mut CompilationUnit) -> (UnitReport, String) {
    rewrite_with(EngineConfig::default(), unit)
}

pub fn rewrite_with(config: EngineConfig, unit: &mut CompilationUnit) -> (UnitReport, String) {
    init_tracing();
    let engine = Engine::new(config).expect("valid engine configuration");
    let report = engine.run_unit(unit);
    let validation = validate_tree(&unit.ctx, unit.root);
    assert!(validation.is_ok(), "{validation}");
    (report, print_node(&unit.ctx, unit.root))
}

// ============================================================================
// Interpreter
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Str(String),
    Set(BTreeSet<i64>),
    Null,
    Void,
}

impl Value {
    fn as_bool(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            other => panic!("expected boolean, got {other:?}"),
        }
    }

    fn as_int(&self) -> i64 {
        match self {
            Value::Int(n) => *n,
            other => panic!("expected int, got {other:?}"),
        }
    }

    fn render(&self) -> String {
        match self {
            Value::Bool(b) => b.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Str(s) => s.clone(),
            Value::Set(items) => format!("{items:?}"),
            Value::Null => "null".to_string(),
            Value::Void => "void".to_string(),
        }
    }
}

/// Everything a run can be observed by.
#[derive(Debug, PartialEq, Eq)]
pub struct Observation {
    pub returned: Option<Value>,
    pub vars: BTreeMap<String, Value>,
    /// Calls to free functions, in order, with rendered arguments.
    pub trace: Vec<String>,
}

enum Flow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

struct Interpreter<'a> {
    ctx: &'a TreeContext,
    vars: BTreeMap<String, Value>,
    trace: Vec<String>,
    fuel: usize,
}

/// Execute the unit at `root` starting from `vars`.
pub fn execute(ctx: &TreeContext, root: NodeRef, vars: &[(&str, Value)]) -> Observation {
    let mut interp = Interpreter {
        ctx,
        vars: vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect(),
        trace: Vec::new(),
        fuel: 1_000,
    };
    let returned = match interp.stmt(root) {
        Flow::Return(value) => Some(value),
        _ => None,
    };
    Observation {
        returned,
        vars: interp.vars,
        trace: interp.trace,
    }
}

impl Interpreter<'_> {
    fn stmts(&mut self, stmts: &[NodeRef]) -> Flow {
        for &stmt in stmts {
            match self.stmt(stmt) {
                Flow::Normal => {}
                other => return other,
            }
        }
        Flow::Normal
    }

    fn stmt(&mut self, node: NodeRef) -> Flow {
        let ctx = self.ctx;
        match ctx.kind(node) {
            NodeKind::Unit { members } => self.stmts(members),
            NodeKind::Block { stmts } => self.stmts(stmts),
            NodeKind::ExprStmt { expr } => {
                self.expr(*expr);
                Flow::Normal
            }
            NodeKind::VarDecl { name, init, .. } => {
                let value = init.map_or(Value::Null, |init| self.expr(init));
                self.vars.insert(name.with_str(str::to_owned), value);
                Flow::Normal
            }
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.expr(*cond).as_bool() {
                    self.stmt(*then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.stmt(*else_branch)
                } else {
                    Flow::Normal
                }
            }
            NodeKind::While { cond, body } => {
                while self.expr(*cond).as_bool() {
                    self.fuel = self.fuel.checked_sub(1).expect("loop ran out of fuel");
                    match self.stmt(*body) {
                        Flow::Break => break,
                        Flow::Return(value) => return Flow::Return(value),
                        Flow::Normal | Flow::Continue => {}
                    }
                }
                Flow::Normal
            }
            NodeKind::Switch { discriminant, body } => self.switch(*discriminant, body),
            NodeKind::Break { label: None } => Flow::Break,
            NodeKind::Continue { label: None } => Flow::Continue,
            NodeKind::Return { value } => {
                Flow::Return(value.map_or(Value::Void, |value| self.expr(value)))
            }
            other => panic!("interpreter cannot run statement {other:?}"),
        }
    }

    fn switch(&mut self, discriminant: NodeRef, body: &[NodeRef]) -> Flow {
        let ctx = self.ctx;
        let key = self.expr(discriminant);
        let mut entry = None;
        let mut default = None;
        for (index, &item) in body.iter().enumerate() {
            if let NodeKind::SwitchCase { label } = ctx.kind(item) {
                match label {
                    Some(label) => {
                        if entry.is_none() && self.expr(*label) == key {
                            entry = Some(index);
                        }
                    }
                    None => default = Some(index),
                }
            }
        }
        let Some(start) = entry.or(default) else {
            return Flow::Normal;
        };
        for &item in &body[start..] {
            if matches!(ctx.kind(item), NodeKind::SwitchCase { .. }) {
                continue;
            }
            match self.stmt(item) {
                Flow::Normal => {}
                Flow::Break => return Flow::Normal,
                other => return other,
            }
        }
        Flow::Normal
    }

    fn expr(&mut self, node: NodeRef) -> Value {
        let ctx = self.ctx;
        match ctx.kind(node) {
            NodeKind::Literal(lit) => match lit {
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Int(n) => Value::Int(*n),
                Literal::Char(c) => Value::Int(*c as i64),
                Literal::Str(s) => Value::Str(s.clone()),
                Literal::Null => Value::Null,
            },
            NodeKind::Name { name, .. } => {
                let name = name.with_str(str::to_owned);
                self.vars
                    .get(&name)
                    .cloned()
                    .unwrap_or_else(|| panic!("unbound variable {name}"))
            }
            NodeKind::Parenthesized { expr } => self.expr(*expr),
            NodeKind::Prefix { op, operand } => {
                let value = self.expr(*operand);
                match op {
                    PrefixOp::Not => Value::Bool(!value.as_bool()),
                    PrefixOp::Minus => Value::Int(-value.as_int()),
                    other => panic!("interpreter cannot run prefix {other:?}"),
                }
            }
            NodeKind::Infix { op, operands } => self.infix(*op, operands),
            NodeKind::Assignment {
                op: None,
                target,
                value,
            } => {
                let value = self.expr(*value);
                let NodeKind::Name { name, .. } = ctx.kind(*target) else {
                    panic!("interpreter only assigns to names");
                };
                self.vars.insert(name.with_str(str::to_owned), value.clone());
                value
            }
            NodeKind::MethodCall {
                receiver,
                name,
                args,
            } => {
                let method = name.with_str(str::to_owned);
                let args: Vec<Value> = args.iter().map(|&arg| self.expr(arg)).collect();
                match receiver {
                    None => {
                        let rendered: Vec<String> = args.iter().map(Value::render).collect();
                        self.trace.push(format!("{method}({})", rendered.join(", ")));
                        Value::Void
                    }
                    Some(receiver) => self.method(*receiver, &method, &args),
                }
            }
            other => panic!("interpreter cannot evaluate {other:?}"),
        }
    }

    fn method(&mut self, receiver: NodeRef, method: &str, args: &[Value]) -> Value {
        let ctx = self.ctx;
        if let NodeKind::Name { name, binding: None } = ctx.kind(receiver) {
            if *name == "String" && method == "valueOf" {
                return Value::Str(args[0].render());
            }
        }
        let NodeKind::Name { name, .. } = ctx.kind(ctx.unparenthesized(receiver)) else {
            panic!("interpreter only calls methods on variables");
        };
        let var = name.with_str(str::to_owned);
        let target = self
            .vars
            .get_mut(&var)
            .unwrap_or_else(|| panic!("unbound variable {var}"));
        match (target, method, args) {
            (Value::Set(items), "add", [Value::Int(n)]) => Value::Bool(items.insert(*n)),
            (Value::Set(items), "remove", [Value::Int(n)]) => Value::Bool(items.remove(n)),
            (Value::Set(items), "contains", [Value::Int(n)]) => Value::Bool(items.contains(n)),
            (Value::Set(items), "size", []) => Value::Int(items.len() as i64),
            (Value::Set(items), "isEmpty", []) => Value::Bool(items.is_empty()),
            (Value::Str(s), "length", []) => Value::Int(s.chars().count() as i64),
            (Value::Str(s), "isEmpty", []) => Value::Bool(s.is_empty()),
            (Value::Str(s), "equals", [other]) => Value::Bool(Value::Str(s.clone()) == *other),
            (target, method, args) => {
                panic!("interpreter cannot call {method}{args:?} on {target:?}")
            }
        }
    }

    fn infix(&mut self, op: InfixOp, operands: &[NodeRef]) -> Value {
        use InfixOp::*;
        let (first, rest) = operands.split_first().expect("infix has operands");
        let mut acc = self.expr(*first);
        for &operand in rest {
            acc = match op {
                ConditionalAnd => {
                    if !acc.as_bool() {
                        return Value::Bool(false);
                    }
                    Value::Bool(self.expr(operand).as_bool())
                }
                ConditionalOr => {
                    if acc.as_bool() {
                        return Value::Bool(true);
                    }
                    Value::Bool(self.expr(operand).as_bool())
                }
                _ => {
                    let right = self.expr(operand);
                    binary(op, acc, right)
                }
            };
        }
        acc
    }
}

fn binary(op: InfixOp, left: Value, right: Value) -> Value {
    use InfixOp::*;
    match op {
        Equals => Value::Bool(left == right),
        NotEquals => Value::Bool(left != right),
        And => Value::Bool(left.as_bool() & right.as_bool()),
        Or => Value::Bool(left.as_bool() | right.as_bool()),
        Less => Value::Bool(left.as_int() < right.as_int()),
        Greater => Value::Bool(left.as_int() > right.as_int()),
        LessEquals => Value::Bool(left.as_int() <= right.as_int()),
        GreaterEquals => Value::Bool(left.as_int() >= right.as_int()),
        Plus => match (&left, &right) {
            (Value::Int(l), Value::Int(r)) => Value::Int(l + r),
            _ => Value::Str(left.render() + &right.render()),
        },
        Minus => Value::Int(left.as_int() - right.as_int()),
        Times => Value::Int(left.as_int() * right.as_int()),
        other => panic!("interpreter cannot run operator {other:?}"),
    }
}
