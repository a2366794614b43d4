//! Integration tests for the Jack compiler (Project 11).
//!
//! Small versions of the course programs, checked against their VM output,
//! plus directory mode and a run of compiled code on the Hack CPU model.

use hack_assembler::assemble;
use hack_assembler::cpu::{Cpu, Halt};
use jack_compiler::{CompileError, compile_directory, compile_file, compile_source, write_result};
use pretty_assertions::assert_eq;
use std::fs;
use vm_translator::{TranslateOptions, VmUnit, translate_units};

// =============================================================================
// Helper Functions
// =============================================================================

fn contains_run(vm: &str, run: &[&str]) -> bool {
    let lines: Vec<&str> = vm.lines().collect();
    lines.windows(run.len()).any(|w| w == run)
}

/// Compile Jack classes, link with bootstrap and run until `Sys.init` returns.
fn run_jack(classes: &[(&str, &str)]) -> Cpu {
    let units: Vec<VmUnit> = classes
        .iter()
        .map(|(name, source)| {
            let vm = compile_source(source)
                .unwrap_or_else(|e| panic!("{} failed to compile: {}", name, e));
            VmUnit::new(*name, vm)
        })
        .collect();
    let asm = translate_units(&units, TranslateOptions::default()).expect("translation failed");
    let binary = assemble(&asm).expect("assembly failed");
    let mut cpu = Cpu::from_hack(&binary).expect("bad binary");
    assert_eq!(cpu.run(5_000_000), Halt::Loop);
    cpu
}

// =============================================================================
// Seven - arithmetic and an OS call
// =============================================================================

#[test]
fn test_seven() {
    let vm = compile_source(
        "class Main {
    function void main() {
        do Output.printInt(1 + (2 * 3));
        return;
    }
}",
    )
    .unwrap();

    assert_eq!(
        vm,
        "function Main.main 0
push constant 1
push constant 2
push constant 3
call Math.multiply 2
add
call Output.printInt 1
pop temp 0
push constant 0
return
"
    );
}

// =============================================================================
// ConvertToBin - loops, conditionals, functions
// =============================================================================

const CONVERT_TO_BIN: &str = "
class Main {
    function void main() {
        var int value;
        let value = Memory.peek(8000);
        do Main.convert(value);
        return;
    }

    function void convert(int value) {
        var int mask, position;
        var boolean loop;
        let loop = true;
        while (loop) {
            let position = position + 1;
            let mask = Main.nextMask(mask);
            if (~(position > 16)) {
                if (~((value & mask) = 0)) {
                    do Memory.poke(8000 + position, 1);
                } else {
                    do Memory.poke(8000 + position, 0);
                }
            } else {
                let loop = false;
            }
        }
        return;
    }

    function int nextMask(int mask) {
        if (mask = 0) {
            return 1;
        } else {
            return mask * 2;
        }
    }
}
";

#[test]
fn test_convert_to_bin() {
    let vm = compile_source(CONVERT_TO_BIN).unwrap();

    assert!(vm.contains("function Main.main 1\n"));
    assert!(vm.contains("function Main.convert 3\n"));
    assert!(vm.contains("function Main.nextMask 0\n"));
    assert!(contains_run(&vm, &["push local 0", "call Main.convert 1", "pop temp 0"]));

    // while label wraps the nested ifs, which count 0 and 1
    assert!(vm.contains("label Main.convert.0.WHILE.CONT\n"));
    assert!(vm.contains("if-goto Main.convert.0.IF.ELSE\n"));
    assert!(vm.contains("if-goto Main.convert.1.IF.ELSE\n"));
    assert!(vm.contains("if-goto Main.nextMask.0.IF.ELSE\n"));
    assert!(contains_run(
        &vm,
        &["push argument 0", "push constant 2", "call Math.multiply 2", "return"]
    ));
}

// =============================================================================
// Square - objects, constructors, methods
// =============================================================================

const SQUARE: &str = "
class Square {
    field int x, y;
    field int size;

    constructor Square new(int ax, int ay, int asize) {
        let x = ax;
        let y = ay;
        let size = asize;
        do draw();
        return this;
    }

    method void dispose() {
        do Memory.deAlloc(this);
        return;
    }

    method void draw() {
        do Screen.setColor(true);
        do Screen.drawRectangle(x, y, x + size, y + size);
        return;
    }

    method void incSize() {
        if (((y + size) < 254) & ((x + size) < 510)) {
            do erase();
            let size = size + 2;
            do draw();
        }
        return;
    }

    method void erase() {
        do Screen.setColor(false);
        do Screen.drawRectangle(x, y, x + size, y + size);
        return;
    }
}
";

const SQUARE_GAME: &str = "
class SquareGame {
    field Square square;
    field int direction;

    constructor SquareGame new() {
        let square = Square.new(0, 0, 30);
        let direction = 0;
        return this;
    }

    method void dispose() {
        do square.dispose();
        do Memory.deAlloc(this);
        return;
    }
}
";

#[test]
fn test_square_constructor() {
    let vm = compile_source(SQUARE).unwrap();
    assert!(contains_run(
        &vm,
        &[
            "function Square.new 0",
            "push constant 3",
            "call Memory.alloc 1",
            "pop pointer 0",
            "push argument 0",
            "pop this 0",
        ]
    ));
    assert!(contains_run(&vm, &["push pointer 0", "call Square.draw 1", "pop temp 0"]));
    assert!(contains_run(&vm, &["push pointer 0", "return"]));
}

#[test]
fn test_square_methods() {
    let vm = compile_source(SQUARE).unwrap();
    assert!(contains_run(
        &vm,
        &[
            "function Square.dispose 0",
            "push argument 0",
            "pop pointer 0",
            "push pointer 0",
            "call Memory.deAlloc 1",
        ]
    ));
    assert!(contains_run(
        &vm,
        &["push constant 0", "not", "call Screen.setColor 1"]
    ));
    assert!(contains_run(&vm, &["push this 1", "push this 2", "add"]));
}

#[test]
fn test_square_game_method_on_field() {
    let vm = compile_source(SQUARE_GAME).unwrap();
    assert!(contains_run(
        &vm,
        &[
            "push constant 0",
            "push constant 0",
            "push constant 30",
            "call Square.new 3",
            "pop this 0",
        ]
    ));
    assert!(contains_run(&vm, &["push this 0", "call Square.dispose 1", "pop temp 0"]));
}

// =============================================================================
// Average - arrays and strings
// =============================================================================

#[test]
fn test_average() {
    let vm = compile_source(
        r#"
class Main {
    function void main() {
        var Array a;
        var int length;
        var int i, sum;

        let length = Keyboard.readInt("How many numbers? ");
        let a = Array.new(length);
        let i = 0;
        while (i < length) {
            let a[i] = Keyboard.readInt("Enter a number: ");
            let sum = sum + a[i];
            let i = i + 1;
        }
        do Output.printString("The average is ");
        do Output.printInt(sum / length);
        return;
    }
}
"#,
    )
    .unwrap();

    assert!(vm.starts_with("function Main.main 4\n"));
    // "How many numbers? " has 18 characters
    assert!(contains_run(&vm, &["push constant 18", "call String.new 1", "push constant 72"]));
    assert!(contains_run(
        &vm,
        &[
            "push local 2",
            "push local 0",
            "add",
            "push constant 16",
            "call String.new 1",
        ]
    ));
    assert!(contains_run(
        &vm,
        &[
            "pop temp 0",
            "pop pointer 1",
            "push temp 0",
            "pop that 0",
        ]
    ));
    assert!(contains_run(&vm, &["push local 3", "push local 1", "call Math.divide 2"]));
}

// =============================================================================
// Runtime behaviour
// =============================================================================

#[test]
fn test_compiled_code_runs() {
    let sys = "
class Sys {
    function void init() {
        var Array ram;
        var int i, sum;
        let i = 0;
        let sum = 0;
        while (i < 10) {
            let sum = sum + i;
            let i = i + 1;
        }
        let ram = 0;
        let ram[8000] = sum;
        let ram[8001] = Sys.fib(10);
        let ram[8002] = -7 + 2;
        if (sum > 40) {
            let ram[8003] = true;
        } else {
            let ram[8003] = 5;
        }
        return;
    }

    function int fib(int n) {
        if (n < 2) {
            return n;
        }
        return Sys.fib(n - 1) + Sys.fib(n - 2);
    }
}
";
    let cpu = run_jack(&[("Sys", sys)]);
    assert_eq!(cpu.peek(8000), 45);
    assert_eq!(cpu.peek(8001), 55);
    assert_eq!(cpu.peek(8002) as i16, -5);
    assert_eq!(cpu.peek(8003), 0xFFFF);
}

// =============================================================================
// Directory mode and errors
// =============================================================================

#[test]
fn test_directory_results_sorted() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Square.jack"), SQUARE).unwrap();
    fs::write(dir.path().join("SquareGame.jack"), SQUARE_GAME).unwrap();
    fs::write(dir.path().join("Main.jack"), CONVERT_TO_BIN).unwrap();
    fs::write(dir.path().join("README"), "not jack").unwrap();

    let results = compile_directory(dir.path()).unwrap();
    let names: Vec<&str> = results.iter().map(|r| r.filename.as_str()).collect();
    assert_eq!(names, vec!["Main.jack", "Square.jack", "SquareGame.jack"]);
    assert!(results.iter().all(|r| r.is_ok()));

    for result in &results {
        let vm = result.output.as_ref().unwrap();
        let path = write_result(result.stem(), vm, dir.path()).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), *vm);
    }
    assert!(dir.path().join("SquareGame.vm").is_file());
}

#[test]
fn test_error_carries_location() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Bad.jack");
    fs::write(
        &path,
        "class Bad {\n  function void f() {\n    let total = 1;\n    return;\n  }\n}\n",
    )
    .unwrap();

    let result = compile_file(&path);
    let err = result.output.unwrap_err();
    assert_eq!(
        err.to_string(),
        "3:9: code generation error: undefined variable 'total'"
    );
}

#[test]
fn test_duplicate_field() {
    let err = compile_source("class A {\n  field int x;\n  static boolean x;\n}").unwrap_err();
    assert!(matches!(err, CompileError::DuplicateDefinition { .. }));
    assert_eq!(err.line(), Some(3));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = compile_file(&dir.path().join("Nope.jack"));
    assert!(matches!(result.output, Err(CompileError::Io { .. })));
}

#[test]
fn test_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    assert!(compile_directory(&dir.path().join("gone")).is_err());
}
