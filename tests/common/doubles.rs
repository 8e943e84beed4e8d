//! Hand-written doubles in the shape a mock generator emits.

use decoy::{
    Async, AsyncFallible, AsyncRethrows, Blocking, Double, Fallible, Member, Rethrows, Scope,
};
use futures_lite::future::Boxed;

/// Error of [`Calculator::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Input was empty.
    Empty,
    /// Input was not a number.
    NotANumber(String),
}

/// Error of [`Storage`] and [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backend unreachable.
    Offline,
    /// Key not present.
    Missing(String),
}

/// Synchronous contract.
pub trait Calculator {
    fn add(&self, a: i32, b: i32) -> i32;
    fn negate(&self, x: i32) -> i32;
    fn reset(&self);
    fn parse(&self, text: &str) -> Result<i32, ParseError>;
}

pub struct CalculatorMock {
    pub double: Double,
    pub add: Member<(i32, i32), i32, Blocking>,
    pub negate: Member<i32, i32, Blocking>,
    pub reset: Member<(), (), Blocking>,
    pub parse: Member<String, i32, Fallible<ParseError>>,
}

impl CalculatorMock {
    pub fn new(scope: &Scope) -> Self {
        let double = scope.double("Calculator");
        Self {
            add: double.method("add", &["a", "b"]),
            negate: double.method("negate", &["x"]),
            reset: double.method("reset", &[]),
            parse: double.method("parse", &["text"]),
            double,
        }
    }
}

impl Calculator for CalculatorMock {
    fn add(&self, a: i32, b: i32) -> i32 {
        self.add.call((a, b))
    }

    fn negate(&self, x: i32) -> i32 {
        self.negate.call(x)
    }

    fn reset(&self) {
        self.reset.call(());
    }

    fn parse(&self, text: &str) -> Result<i32, ParseError> {
        self.parse.call(text.to_owned())
    }
}

/// Asynchronous contract.
pub trait Storage {
    fn load(&self, key: &str) -> Boxed<Option<String>>;
    fn save(&self, key: &str, value: &str) -> Boxed<Result<(), StoreError>>;
}

pub struct StorageMock {
    pub double: Double,
    pub load: Member<String, Option<String>, Async>,
    pub save: Member<(String, String), (), AsyncFallible<StoreError>>,
}

impl StorageMock {
    pub fn new(scope: &Scope) -> Self {
        let double = scope.double("Storage");
        Self {
            load: double.method("load", &["key"]),
            save: double.method("save", &["key", "value"]),
            double,
        }
    }
}

impl Storage for StorageMock {
    fn load(&self, key: &str) -> Boxed<Option<String>> {
        self.load.call(key.to_owned())
    }

    fn save(&self, key: &str, value: &str) -> Boxed<Result<(), StoreError>> {
        self.save.call((key.to_owned(), value.to_owned()))
    }
}

/// Contract whose errors are routed through caller continuations.
pub trait Transport {
    fn send<F>(
        &self,
        payload: &[u8],
        on_error: impl FnOnce(StoreError) -> Result<usize, F>,
    ) -> Result<usize, F>;

    fn fetch<F: Send + 'static>(
        &self,
        path: &str,
        on_error: impl FnOnce(StoreError) -> Result<Vec<u8>, F> + Send + 'static,
    ) -> Boxed<Result<Vec<u8>, F>>;
}

pub struct TransportMock {
    pub double: Double,
    pub send: Member<Vec<u8>, usize, Rethrows<StoreError>>,
    pub fetch: Member<String, Vec<u8>, AsyncRethrows<StoreError>>,
}

impl TransportMock {
    pub fn new(scope: &Scope) -> Self {
        let double = scope.double("Transport");
        Self {
            send: double.method("send", &["payload"]),
            fetch: double.method("fetch", &["path"]),
            double,
        }
    }
}

impl Transport for TransportMock {
    fn send<F>(
        &self,
        payload: &[u8],
        on_error: impl FnOnce(StoreError) -> Result<usize, F>,
    ) -> Result<usize, F> {
        self.send.call(payload.to_vec(), on_error)
    }

    fn fetch<F: Send + 'static>(
        &self,
        path: &str,
        on_error: impl FnOnce(StoreError) -> Result<Vec<u8>, F> + Send + 'static,
    ) -> Boxed<Result<Vec<u8>, F>> {
        self.fetch.call(path.to_owned(), on_error)
    }
}

/// Contract with a property and an indexer.
pub trait Settings {
    fn volume(&self) -> u8;
    fn set_volume(&self, value: u8);
    fn cell(&self, row: usize, column: usize) -> Option<String>;
    fn set_cell(&self, row: usize, column: usize, value: Option<String>);
}

pub struct SettingsMock {
    pub double: Double,
    pub volume_get: Member<(), u8, Blocking>,
    pub volume_set: Member<u8, (), Blocking>,
    pub cell_get: Member<(usize, usize), Option<String>, Blocking>,
    pub cell_set: Member<(usize, usize, Option<String>), (), Blocking>,
}

impl SettingsMock {
    pub fn new(scope: &Scope) -> Self {
        let double = scope.double("Settings");
        Self {
            volume_get: double.getter("volume"),
            volume_set: double.setter("volume"),
            cell_get: double.subscript_getter(&["row", "column"]),
            cell_set: double.subscript_setter(&["row", "column"]),
            double,
        }
    }
}

impl Settings for SettingsMock {
    fn volume(&self) -> u8 {
        self.volume_get.call(())
    }

    fn set_volume(&self, value: u8) {
        self.volume_set.call(value);
    }

    fn cell(&self, row: usize, column: usize) -> Option<String> {
        self.cell_get.call((row, column))
    }

    fn set_cell(&self, row: usize, column: usize, value: Option<String>) {
        self.cell_set.call((row, column, value));
    }
}
