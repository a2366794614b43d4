//! Property-based tests for the VM translator.
//!
//! Random VM programs must never panic the translator; valid ones are
//! assembled and executed to check the stack discipline and label
//! uniqueness.

use std::collections::HashSet;

use hack_assembler::assemble;
use hack_assembler::cpu::{Cpu, Halt};
use proptest::prelude::*;
use vm_translator::{TranslateOptions, VmUnit, translate, translate_units};

/// Generate arbitrary arithmetic commands
fn arb_arithmetic() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["add", "sub", "neg", "eq", "lt", "gt", "and", "or", "not"])
        .prop_map(str::to_string)
}

/// Generate valid push commands
fn arb_push() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u16..32768).prop_map(|n| format!("push constant {}", n)),
        (0u16..8).prop_map(|n| format!("push temp {}", n)),
        (0u16..2).prop_map(|n| format!("push pointer {}", n)),
        (0u16..100).prop_map(|n| format!("push local {}", n)),
        (0u16..100).prop_map(|n| format!("push argument {}", n)),
        (0u16..100).prop_map(|n| format!("push this {}", n)),
        (0u16..100).prop_map(|n| format!("push that {}", n)),
        (0u16..240).prop_map(|n| format!("push static {}", n)),
    ]
}

/// Generate valid pop commands
fn arb_pop() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u16..8).prop_map(|n| format!("pop temp {}", n)),
        (0u16..2).prop_map(|n| format!("pop pointer {}", n)),
        (0u16..100).prop_map(|n| format!("pop local {}", n)),
        (0u16..100).prop_map(|n| format!("pop argument {}", n)),
        (0u16..100).prop_map(|n| format!("pop this {}", n)),
        (0u16..100).prop_map(|n| format!("pop that {}", n)),
        (0u16..240).prop_map(|n| format!("pop static {}", n)),
    ]
}

/// Label names, including ones shaped like generated return labels
fn arb_label_name() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[A-Z][A-Z0-9_]{0,10}",
        1 => (0u16..8).prop_map(|n| format!("ret.{}", n)),
    ]
}

/// Function names shaped like generated comparison labels
fn arb_comparison_lookalike() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!["EQ", "GT", "LT"]),
        prop::sample::select(vec!["TRUE", "END"]),
        0usize..4,
        1usize..40,
    )
        .prop_map(|(op, kind, unit, line)| format!("{}_{}.Unit{}.{}", op, kind, unit, line))
}

fn arb_branching() -> impl Strategy<Value = String> {
    arb_label_name().prop_flat_map(|name| {
        prop_oneof![
            Just(format!("label {}", name)),
            Just(format!("goto {}", name)),
            Just(format!("if-goto {}", name)),
        ]
    })
}

fn arb_function_name() -> impl Strategy<Value = String> {
    ("[A-Z][a-zA-Z0-9]*", "[a-z][a-zA-Z0-9]*")
        .prop_map(|(class, method)| format!("{}.{}", class, method))
}

fn arb_valid_vm_line() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => arb_arithmetic(),
        4 => arb_push(),
        3 => arb_pop(),
        2 => arb_branching(),
        1 => (arb_function_name(), 0u16..10).prop_map(|(n, k)| format!("function {} {}", n, k)),
        1 => (arb_function_name(), 0u16..10).prop_map(|(n, k)| format!("call {} {}", n, k)),
        1 => Just("return".to_string()),
    ]
}

/// Arbitrary VM lines including invalid ones
fn arb_vm_line() -> impl Strategy<Value = String> {
    prop_oneof![
        8 => arb_valid_vm_line(),
        1 => Just("// This is a comment".to_string()),
        1 => Just("".to_string()),
        1 => "[a-z]{3,10}",
        1 => "push [a-z]+ -?[0-9]+",
        1 => "[\\x20-\\x7E]{0,30}",
    ]
}

fn arb_vm_program() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_vm_line(), 0..50).prop_map(|lines| lines.join("\n"))
}

/// A stack operation together with its net effect on SP.
#[derive(Debug, Clone)]
enum StackOp {
    PushConstant(u16),
    PushTemp(u16),
    PopTemp(u16),
    Binary(&'static str),
    Unary(&'static str),
}

impl StackOp {
    fn to_vm(&self) -> String {
        match self {
            StackOp::PushConstant(n) => format!("push constant {}", n),
            StackOp::PushTemp(i) => format!("push temp {}", i),
            StackOp::PopTemp(i) => format!("pop temp {}", i),
            StackOp::Binary(op) | StackOp::Unary(op) => op.to_string(),
        }
    }
}

fn arb_stack_op() -> impl Strategy<Value = StackOp> {
    prop_oneof![
        3 => (0u16..=32767).prop_map(StackOp::PushConstant),
        1 => (0u16..8).prop_map(StackOp::PushTemp),
        1 => (0u16..8).prop_map(StackOp::PopTemp),
        2 => prop::sample::select(vec!["add", "sub", "and", "or", "eq", "gt", "lt"])
            .prop_map(StackOp::Binary),
        1 => prop::sample::select(vec!["neg", "not"]).prop_map(StackOp::Unary),
    ]
}

/// Keep only the ops whose operands are on the stack, tracking depth.
fn well_formed(ops: Vec<StackOp>) -> (Vec<StackOp>, i32) {
    let mut depth = 0i32;
    let mut kept = Vec::new();
    for op in ops {
        let (needs, delta) = match op {
            StackOp::PushConstant(_) | StackOp::PushTemp(_) => (0, 1),
            StackOp::PopTemp(_) => (1, -1),
            StackOp::Binary(_) => (2, -1),
            StackOp::Unary(_) => (1, 0),
        };
        if depth >= needs {
            depth += delta;
            kept.push(op);
        }
    }
    (kept, depth)
}

/// Reference VM semantics for the value-level check.
fn reference(ops: &[StackOp]) -> Vec<u16> {
    let mut stack: Vec<u16> = Vec::new();
    let mut temp = [0u16; 8];
    for op in ops {
        match op {
            StackOp::PushConstant(n) => stack.push(*n),
            StackOp::PushTemp(i) => stack.push(temp[*i as usize]),
            StackOp::PopTemp(i) => temp[*i as usize] = stack.pop().unwrap(),
            StackOp::Unary(op) => {
                let x = stack.pop().unwrap();
                stack.push(if *op == "neg" { x.wrapping_neg() } else { !x });
            }
            StackOp::Binary(op) => {
                let y = stack.pop().unwrap();
                let x = stack.pop().unwrap();
                let r = match *op {
                    "add" => x.wrapping_add(y),
                    "sub" => x.wrapping_sub(y),
                    "and" => x & y,
                    "or" => x | y,
                    other => unreachable!("{}", other),
                };
                stack.push(r);
            }
        }
    }
    stack
}

fn run(asm: &str) -> Cpu {
    let mut cpu = Cpu::from_hack(&assemble(asm).unwrap()).unwrap();
    cpu.poke(0, 256);
    assert_eq!(cpu.run(1_000_000), Halt::EndOfRom);
    cpu
}

fn defined_labels(asm: &str) -> Vec<&str> {
    asm.lines()
        .filter_map(|l| l.strip_prefix('(').and_then(|l| l.strip_suffix(')')))
        .collect()
}

proptest! {
    /// Test that translator never panics on arbitrary input
    #[test]
    fn test_no_panic_on_arbitrary_input(input in arb_vm_program()) {
        let _ = translate(&input, "Test");
    }

    /// SP moves by exactly (#pushes - #pops); binary ops pop one, unary none
    #[test]
    fn test_stack_invariant(ops in prop::collection::vec(arb_stack_op(), 1..60)) {
        let (ops, depth) = well_formed(ops);
        let source: Vec<String> = ops.iter().map(StackOp::to_vm).collect();
        let asm = translate(&source.join("\n"), "Stack").unwrap();

        let cpu = run(&asm);
        prop_assert_eq!(cpu.peek(0) as i32, 256 + depth);
    }

    /// Without comparisons the stack contents match a reference interpreter
    #[test]
    fn test_stack_values(ops in prop::collection::vec(arb_stack_op(), 1..60)) {
        let ops: Vec<StackOp> = ops
            .into_iter()
            .filter(|op| !matches!(op, StackOp::Binary("eq" | "gt" | "lt")))
            .collect();
        let (ops, _) = well_formed(ops);
        let source: Vec<String> = ops.iter().map(StackOp::to_vm).collect();
        let asm = translate(&source.join("\n"), "Stack").unwrap();

        let cpu = run(&asm);
        let expected = reference(&ops);
        let actual: Vec<u16> = (0..expected.len()).map(|i| cpu.peek(256 + i as u16)).collect();
        prop_assert_eq!(actual, expected);
    }

    /// Comparisons push -1 for true and 0 for false
    #[test]
    fn test_comparisons(x in 0u16..=32767, y in 0u16..=32767) {
        let source = format!(
            "push constant {x}\npush constant {y}\neq\n\
             push constant {x}\npush constant {y}\ngt\n\
             push constant {x}\npush constant {y}\nlt"
        );
        let cpu = run(&translate(&source, "Cmp").unwrap());
        let truth = |b: bool| if b { 0xFFFF } else { 0 };
        prop_assert_eq!(cpu.peek(256), truth(x == y));
        prop_assert_eq!(cpu.peek(257), truth(x > y));
        prop_assert_eq!(cpu.peek(258), truth(x < y));
    }

    /// No two emitted labels collide across the units of a link unit, even
    /// when user names look like generated ones
    #[test]
    fn test_label_uniqueness(
        bodies in prop::collection::vec(
            prop::collection::vec(
                prop_oneof![
                    arb_arithmetic(),
                    (0u16..100).prop_map(|n| format!("push constant {}", n)),
                    Just("call Sys.init 0".to_string()),
                ],
                0..15,
            ),
            1..5,
        ),
        labels in prop::collection::btree_set(arb_label_name(), 1..5),
        lookalikes in prop::collection::btree_set(arb_comparison_lookalike(), 0..4),
    ) {
        let mut units = Vec::new();
        for (i, body) in bodies.iter().enumerate() {
            let name = format!("Unit{}", i);
            let mut source = vec![format!("function {}.main 0", name)];
            source.extend(labels.iter().map(|l| format!("label {}", l)));
            source.extend(body.iter().cloned());
            source.push(format!("function {}.helper 0", name));
            source.extend(labels.iter().map(|l| format!("label {}", l)));
            source.extend(body.iter().cloned());
            source.push("return".to_string());
            units.push(VmUnit::new(name, source.join("\n")));
        }
        let mut sys = vec!["function Sys.init 0".to_string()];
        sys.extend(labels.iter().map(|l| format!("label {}", l)));
        for f in &lookalikes {
            sys.push(format!("function {} 0", f));
            sys.push("push constant 0".to_string());
            sys.push("return".to_string());
        }
        units.push(VmUnit::new("Sys", sys.join("\n")));

        let asm = translate_units(&units, TranslateOptions::default()).unwrap();
        let defined = defined_labels(&asm);
        let unique: HashSet<&str> = defined.iter().copied().collect();
        prop_assert_eq!(unique.len(), defined.len());
        prop_assert!(assemble(&asm).is_ok());
    }

    #[test]
    fn test_invalid_temp_index(index in 8u16..100) {
        let src = format!("push temp {}", index);
        prop_assert!(translate(&src, "Test").is_err());
    }

    #[test]
    fn test_invalid_pointer_index(index in 2u16..100) {
        let src = format!("pop pointer {}", index);
        prop_assert!(translate(&src, "Test").is_err());
    }

    #[test]
    fn test_pop_to_constant_fails(n in 0u16..32768) {
        let src = format!("pop constant {}", n);
        prop_assert!(translate(&src, "Test").is_err());
    }

    #[test]
    fn test_negative_indices_fail(n in 1u32..100_000) {
        let src = format!("push local -{}", n);
        prop_assert!(translate(&src, "Test").is_err());
    }

    #[test]
    fn test_static_naming(index in 0u16..240) {
        let asm = translate(&format!("push static {}", index), "TestFile").unwrap();
        let expected = format!("@TestFile.{}", index);
        prop_assert!(asm.contains(&expected));
    }

    #[test]
    fn test_comments_stripped(comment in "// [a-zA-Z0-9 ]{0,50}") {
        let asm = translate(&format!("{}\npush constant 10", comment), "Test").unwrap();
        prop_assert_eq!(asm, "@10\nD=A\n@SP\nA=M\nM=D\n@SP\nM=M+1\n");
    }
}
