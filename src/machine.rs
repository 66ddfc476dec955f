use {
    crate::*,
    derive_deref::Deref,
    nom::{
        bytes::complete::tag,
        character::complete::line_ending,
        combinator::{map, map_res},
        multi::{many_m_n, separated_list1},
        sequence::{preceded, tuple},
        IResult,
    },
    static_assertions::const_assert,
    strum::{EnumCount, EnumIter, IntoEnumIterator, VariantNames},
    strum_macros::EnumVariantNames,
};

#[cfg_attr(test, derive(Debug, PartialEq))]
#[derive(Clone, Copy, EnumCount, EnumIter, EnumVariantNames)]
pub enum Register {
    A,
    B,
    C,
}

// Combo operand codes 4 through 6 map onto the registers in declaration order.
const_assert!(Register::COUNT == 3_usize);

#[cfg_attr(test, derive(Debug, PartialEq))]
#[derive(Clone, Copy, Default)]
pub struct Registers([u64; Register::COUNT]);

impl Registers {
    pub fn new(a: u64, b: u64, c: u64) -> Self {
        Self([a, b, c])
    }

    #[inline]
    pub fn get(self, register: Register) -> u64 {
        self.0[register as usize]
    }

    #[inline]
    fn set(&mut self, register: Register, value: u64) {
        self.0[register as usize] = value;
    }
}

impl Parse for Registers {
    fn parse<'i>(input: &'i str) -> IResult<&'i str, Self> {
        let mut registers: Self = Self::default();
        let mut register_iter: RegisterIter = Register::iter();

        let input: &str = many_m_n(Register::COUNT, Register::COUNT, |input: &'i str| {
            let register: Register = register_iter.next().unwrap();
            let (input, value): (&str, u64) = map(
                tuple((
                    tag("Register "),
                    tag(Register::VARIANTS[register as usize]),
                    tag(": "),
                    parse_integer,
                    line_ending,
                )),
                |(_, _, _, value, _)| value,
            )(input)?;

            registers.set(register, value);

            Ok((input, ()))
        })(input)?
        .0;

        Ok((input, registers))
    }
}

#[derive(Debug, PartialEq)]
pub enum ProgramError {
    OddLength { len: usize },
    ValueOutOfRange { index: usize, value: u8 },
}

/// An immutable sequence of 3-bit values, consumed in (opcode, operand) pairs.
///
/// Only constructible through `try_new`, so holders can rely on every value fitting in 3 bits and
/// the length being even.
#[cfg_attr(test, derive(Debug, PartialEq))]
#[derive(Clone, Deref)]
pub struct Program(Vec<u8>);

impl Program {
    pub const BITS: u32 = 3_u32;
    pub const VALUE_COUNT: u8 = 1_u8 << Self::BITS;

    pub fn is_value_valid(value: u8) -> bool {
        value < Self::VALUE_COUNT
    }

    pub fn try_new(values: Vec<u8>) -> Result<Self, ProgramError> {
        if values.len() % 2_usize != 0_usize {
            Err(ProgramError::OddLength { len: values.len() })
        } else if let Some((index, &value)) = values
            .iter()
            .enumerate()
            .find(|&(_, &value)| !Self::is_value_valid(value))
        {
            Err(ProgramError::ValueOutOfRange { index, value })
        } else {
            Ok(Self(values))
        }
    }
}

impl Parse for Program {
    fn parse<'i>(input: &'i str) -> IResult<&'i str, Self> {
        map_res(
            preceded(tag("Program: "), separated_list1(tag(","), parse_integer)),
            Self::try_new,
        )(input)
    }
}

#[derive(Debug, PartialEq)]
pub enum MachineError {
    /// A combo operand with raw value 7 was fetched. Fatal to the run.
    ReservedComboOperand,

    /// Unreachable for a validated `Program`.
    UnknownOpCode(u8),

    /// The run executed its full step budget without halting.
    StepBudgetExhausted { steps: u64 },
}

#[cfg_attr(test, derive(Debug, PartialEq))]
#[derive(Clone, Copy)]
enum ComboOperand {
    Literal(u8),
    Register(Register),
}

impl ComboOperand {
    fn try_new(value: u8) -> Result<Self, MachineError> {
        match value {
            0_u8..=3_u8 => Ok(Self::Literal(value)),
            4_u8 => Ok(Self::Register(Register::A)),
            5_u8 => Ok(Self::Register(Register::B)),
            6_u8 => Ok(Self::Register(Register::C)),
            _ => Err(MachineError::ReservedComboOperand),
        }
    }

    fn value(self, registers: &Registers) -> u64 {
        match self {
            Self::Literal(literal_operand) => literal_operand as u64,
            Self::Register(register) => registers.get(register),
        }
    }
}

#[derive(Clone, Copy)]
enum Instruction {
    Div(ComboOperand, Register),
    Bxl(u8),
    Bst(ComboOperand),
    Jnz(u8),
    Bxc,
    Out(ComboOperand),
}

impl Instruction {
    fn try_new(op_code: u8, operand: u8) -> Result<Self, MachineError> {
        match op_code {
            0_u8 | 6_u8 | 7_u8 => Ok(Self::Div(
                ComboOperand::try_new(operand)?,
                match op_code {
                    0_u8 => Register::A,
                    6_u8 => Register::B,
                    _ => Register::C,
                },
            )),
            1_u8 => Ok(Self::Bxl(operand)),
            2_u8 => Ok(Self::Bst(ComboOperand::try_new(operand)?)),
            3_u8 => Ok(Self::Jnz(operand)),
            4_u8 => Ok(Self::Bxc),
            5_u8 => Ok(Self::Out(ComboOperand::try_new(operand)?)),
            op_code => Err(MachineError::UnknownOpCode(op_code)),
        }
    }

    fn execute(self, machine: &mut Machine) {
        let mut instruction_pointer_jump: Option<usize> = None;

        match self {
            Self::Div(combo_operand, register) => {
                let value: u64 = shift_right(
                    machine.registers.get(Register::A),
                    combo_operand.value(&machine.registers),
                );

                machine.registers.set(register, value);
            }
            Self::Bxl(literal_operand) => {
                let value: u64 = machine.registers.get(Register::B) ^ literal_operand as u64;

                machine.registers.set(Register::B, value);
            }
            Self::Bst(combo_operand) => {
                let value: u64 =
                    combo_operand.value(&machine.registers) % Program::VALUE_COUNT as u64;

                machine.registers.set(Register::B, value);
            }
            Self::Jnz(literal_operand) => {
                instruction_pointer_jump = (machine.registers.get(Register::A) != 0_u64)
                    .then_some(literal_operand as usize);
            }
            Self::Bxc => {
                let value: u64 =
                    machine.registers.get(Register::B) ^ machine.registers.get(Register::C);

                machine.registers.set(Register::B, value);
            }
            Self::Out(combo_operand) => {
                let value: u64 =
                    combo_operand.value(&machine.registers) % Program::VALUE_COUNT as u64;

                machine.output.push(value as u8);
            }
        }

        machine.instruction_pointer =
            instruction_pointer_jump.unwrap_or(machine.instruction_pointer + 2_usize);
    }
}

/// Register values are non-negative, so a logical right shift and a truncating division by a power
/// of two agree. Shift counts of 64 or more drain the value to zero instead of wrapping.
fn shift_right(value: u64, shift: u64) -> u64 {
    if shift < u64::BITS as u64 {
        value >> shift
    } else {
        0_u64
    }
}

/// One execution of a `Program`: a register bank, an instruction pointer, and the values emitted
/// so far. The machine owns its registers for the duration of the run; the caller owns the final
/// state afterwards.
#[cfg_attr(test, derive(Debug, PartialEq))]
pub struct Machine {
    registers: Registers,
    instruction_pointer: usize,
    output: Vec<u8>,
}

impl Machine {
    /// Generous for any program that halts: the self-referential layout retires well under 200
    /// steps per run.
    pub const DEFAULT_STEP_BUDGET: u64 = 1_u64 << 20_u32;

    pub fn new(registers: Registers) -> Self {
        Self {
            registers,
            instruction_pointer: 0_usize,
            output: Vec::new(),
        }
    }

    #[inline]
    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    #[inline]
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Runs until the instruction pointer no longer addresses a full (opcode, operand) pair,
    /// including after a jump past the end or onto a trailing lone opcode.
    ///
    /// A conditional jump can loop forever, so a halting run is not guaranteed for arbitrary
    /// programs; `step_budget` bounds the attempt.
    pub fn run(&mut self, program: &Program, step_budget: u64) -> Result<(), MachineError> {
        let mut steps: u64 = 0_u64;

        while let Some(instruction_values) =
            program.get(self.instruction_pointer..self.instruction_pointer + 2_usize)
        {
            if steps == step_budget {
                return Err(MachineError::StepBudgetExhausted { steps });
            }

            let instruction: Instruction = Instruction::try_new(
                *instruction_values.first().unwrap(),
                *instruction_values.last().unwrap(),
            )?;

            instruction.execute(self);
            steps += 1_u64;
        }

        Ok(())
    }
}
