//! A tiny Jack OS for running compiled programs on the CPU model: a bump
//! allocator, arrays, strings, multiply/divide and a `Sys.init` that runs
//! `Main.main` and returns into the bootstrap's halt loop.

#![allow(dead_code)]

use hack_assembler::cpu::{Cpu, Halt};

pub const MEMORY: &str = "
class Memory {
    static Array ram;
    static int free;

    function void init() {
        let ram = 0;
        let free = 2048;
        return;
    }

    function int peek(int address) {
        return ram[address];
    }

    function void poke(int address, int value) {
        let ram[address] = value;
        return;
    }

    function int alloc(int size) {
        var int block;
        let block = free;
        let free = free + size;
        return block;
    }

    function void deAlloc(Array o) {
        return;
    }
}
";

pub const ARRAY: &str = "
class Array {
    function Array new(int size) {
        return Memory.alloc(size);
    }

    method void dispose() {
        do Memory.deAlloc(this);
        return;
    }
}
";

pub const STRING: &str = "
class String {
    field Array chars;
    field int len;

    constructor String new(int maxLength) {
        if (maxLength = 0) {
            let maxLength = 1;
        }
        let chars = Array.new(maxLength);
        let len = 0;
        return this;
    }

    method int length() {
        return len;
    }

    method char charAt(int i) {
        return chars[i];
    }

    method String appendChar(char c) {
        let chars[len] = c;
        let len = len + 1;
        return this;
    }
}
";

pub const MATH: &str = "
class Math {
    function int multiply(int x, int y) {
        var int sum, i;
        var boolean negative;
        let negative = false;
        if (y < 0) {
            let y = -y;
            let negative = true;
        }
        let sum = 0;
        let i = 0;
        while (i < y) {
            let sum = sum + x;
            let i = i + 1;
        }
        if (negative) {
            return -sum;
        }
        return sum;
    }

    function int divide(int x, int y) {
        var int q;
        var boolean negative;
        let negative = false;
        if (x < 0) {
            let x = -x;
            let negative = ~negative;
        }
        if (y < 0) {
            let y = -y;
            let negative = ~negative;
        }
        let q = 0;
        while (~(x < y)) {
            let x = x - y;
            let q = q + 1;
        }
        if (negative) {
            return -q;
        }
        return q;
    }
}
";

pub const SYS: &str = "
class Sys {
    function void init() {
        do Memory.init();
        do Main.main();
        return;
    }
}
";

/// OS classes as `(name, source)` pairs.
pub fn os() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Array", ARRAY),
        ("Math", MATH),
        ("Memory", MEMORY),
        ("String", STRING),
        ("Sys", SYS),
    ]
}

/// Load a `.hack` program and run it until it parks in the halt loop.
pub fn run_hack(binary: &str) -> Cpu {
    let mut cpu = Cpu::from_hack(binary).expect("bad binary");
    assert_eq!(cpu.run(20_000_000), Halt::Loop);
    cpu
}
