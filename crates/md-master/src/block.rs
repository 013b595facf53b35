//! Blocks: named statement lists that each drive one channel.

use std::fmt;
use std::sync::Arc;

use md_engine::SyncLink;
use md_ir::{instruments, Beat, Dynamic, GradualDynamic, Phrase, SchedulerDirective};

/// Where a statement came from in the notation source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// One already type-checked operation against a block's channel.
#[derive(Clone, Debug)]
pub enum Statement {
    PlayPhrase(Phrase),
    Rest(Beat),
    SetDynamic(Dynamic),
    GradualDynamic(GradualDynamic),
    SetInstrument(u8),
    SetSoundBank(u8),
    SetOctave(i32),
    SetTranspose(i32),
    SetMuted(bool),
    TwistKnob { controller: u8, value: u8 },
    PressPedal(u8),
    ReleasePedal(u8),
    SetPitchBend(u16),
    /// Wait for every other member of the link, then continue together.
    Sync(Arc<SyncLink>),
    Directive(SchedulerDirective),
}

impl Statement {
    /// Program change by General MIDI instrument name.
    pub fn instrument(name: &str) -> Option<Statement> {
        instruments::program(name).map(Statement::SetInstrument)
    }
}

#[derive(Clone, Debug)]
pub struct Located {
    pub location: SourceLocation,
    pub statement: Statement,
}

/// A named block of statements compiled onto its own channel.
#[derive(Clone, Debug)]
pub struct Block {
    name: String,
    percussion: bool,
    /// Applied before each pass through the statements.
    directive: Option<SchedulerDirective>,
    statements: Vec<Located>,
}

impl Block {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            percussion: false,
            directive: None,
            statements: Vec::new(),
        }
    }

    /// A block that plays on the percussion channel.
    pub fn percussion(name: impl Into<String>) -> Self {
        Self {
            percussion: true,
            ..Self::new(name)
        }
    }

    pub fn with_directive(mut self, directive: SchedulerDirective) -> Self {
        self.directive = Some(directive);
        self
    }

    /// Append a statement, located on the line after the previous one.
    pub fn push(&mut self, statement: Statement) -> &mut Self {
        let line = self.statements.last().map_or(1, |s| s.location.line + 1);
        self.push_at(SourceLocation::new(line, 1), statement)
    }

    pub fn push_at(&mut self, location: SourceLocation, statement: Statement) -> &mut Self {
        self.statements.push(Located {
            location,
            statement,
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_percussion(&self) -> bool {
        self.percussion
    }

    pub fn directive(&self) -> Option<&SchedulerDirective> {
        self.directive.as_ref()
    }

    pub fn statements(&self) -> &[Located] {
        &self.statements
    }
}
