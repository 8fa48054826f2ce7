//! Subset of the Yosys `write_json` format needed to rebuild a gate-level netlist.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::{error::LoadError, graph::Signal};

#[derive(Debug, Clone, Deserialize)]
pub struct Design {
    #[serde(default)]
    pub modules: IndexMap<String, Module>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Module {
    #[serde(default)]
    pub ports: IndexMap<String, Port>,
    #[serde(default)]
    pub cells: IndexMap<String, Cell>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
    Inout,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Port {
    pub direction: Direction,
    pub bits: Vec<Bit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Cell {
    #[serde(rename = "type")]
    pub cell_type: String,
    #[serde(default)]
    pub port_directions: IndexMap<String, Direction>,
    #[serde(default)]
    pub connections: IndexMap<String, Vec<Bit>>,
}

/// A bit is a net number, or one of the strings `"0"`, `"1"`, `"x"`, `"z"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Bit {
    Net(u64),
    Const(String),
}

impl Bit {
    pub fn signal(&self) -> Result<Signal, LoadError> {
        match self {
            Bit::Net(n) => Ok(Signal::Net(*n)),
            Bit::Const(s) if s == "0" => Ok(Signal::Const(false)),
            Bit::Const(s) if s == "1" => Ok(Signal::Const(true)),
            Bit::Const(s) => Err(LoadError::UndefinedBit(s.clone())),
        }
    }
}

impl Design {
    pub fn from_json(json: &str) -> Result<Design, LoadError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bits() {
        let port: Port =
            serde_json::from_str(r#"{"direction": "output", "bits": [2, "1", "0", "x"]}"#).unwrap();
        assert_eq!(port.direction, Direction::Output);
        assert_eq!(port.bits[0].signal().unwrap(), Signal::Net(2));
        assert_eq!(port.bits[1].signal().unwrap(), Signal::Const(true));
        assert_eq!(port.bits[2].signal().unwrap(), Signal::Const(false));
        assert!(matches!(
            port.bits[3].signal(),
            Err(LoadError::UndefinedBit(s)) if s == "x"
        ));
    }

    #[test]
    fn unknown_fields_ignored() {
        let design = Design::from_json(
            r#"{
                "creator": "Yosys",
                "modules": {
                    "top": {
                        "attributes": {"top": "1"},
                        "ports": {},
                        "cells": {
                            "c": {
                                "hide_name": 0,
                                "type": "NOT",
                                "parameters": {},
                                "connections": {"A": [2], "Y": [3]}
                            }
                        },
                        "netnames": {}
                    }
                }
            }"#,
        )
        .unwrap();
        let cell = &design.modules["top"].cells["c"];
        assert_eq!(cell.cell_type, "NOT");
        assert!(cell.port_directions.is_empty());
    }
}
