//! Port index: a bit-sliced port number combined with a categorical
//! protocol map (§4.3).

use std::collections::HashMap;

use vast_bitmap::{self as bm, Bitmap};
use vast_value::{Port, Protocol, Value};

use crate::error::IndexError;
use crate::op::ClauseOp;
use crate::value_index::ValueIndex;

const WIDTH: u32 = 16;

pub struct PortIndex {
    universe: Bitmap,
    equality: HashMap<Port, Bitmap>,
    /// Bit-slices of the port number, MSB-first.
    number_bits: Vec<Bitmap>,
    protocol: HashMap<Protocol, Bitmap>,
    len: u64,
}

impl PortIndex {
    pub fn new() -> Self {
        Self {
            universe: Bitmap::new(),
            equality: HashMap::new(),
            number_bits: (0..WIDTH).map(|_| Bitmap::new()).collect(),
            protocol: HashMap::new(),
            len: 0,
        }
    }

    fn bit_of(number: u16, i: u32) -> bool {
        (number >> (WIDTH - 1 - i)) & 1 != 0
    }

    fn equal_to(&self, port: &Port) -> Bitmap {
        self.equality
            .get(port)
            .cloned()
            .unwrap_or_else(|| Bitmap::zeros(self.len))
    }
}

impl Default for PortIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueIndex for PortIndex {
    fn push(&mut self, position: u64, value: Option<&Value>) -> Result<(), IndexError> {
        if position != self.len {
            return Err(IndexError::OutOfOrder {
                expected: self.len,
                actual: position,
            });
        }
        match value {
            Some(Value::Port(port)) => {
                self.universe.append_bits(true, 1);
                for i in 0..WIDTH {
                    self.number_bits[i as usize].append_bits(Self::bit_of(port.number(), i), 1);
                }
                for (proto, bitmap) in self.protocol.iter_mut() {
                    bitmap.append_bits(*proto == port.protocol(), 1);
                }
                self.protocol
                    .entry(port.protocol())
                    .or_insert_with(|| Bitmap::zeros(self.len))
                    .append_bits(true, 1);
                for (k, eq_bm) in self.equality.iter_mut() {
                    eq_bm.append_bits(k == port, 1);
                }
                self.equality
                    .entry(*port)
                    .or_insert_with(|| Bitmap::zeros(self.len))
                    .append_bits(true, 1);
            }
            Some(other) => {
                return Err(IndexError::TypeMismatch {
                    expected: "port",
                    actual: other.type_tag(),
                })
            }
            None => {
                self.universe.append_bits(false, 1);
                for i in 0..WIDTH {
                    self.number_bits[i as usize].append_bits(false, 1);
                }
                for bitmap in self.protocol.values_mut() {
                    bitmap.append_bits(false, 1);
                }
                for eq_bm in self.equality.values_mut() {
                    eq_bm.append_bits(false, 1);
                }
            }
        }
        self.len += 1;
        Ok(())
    }

    fn lookup(&self, op: ClauseOp, value: &Value) -> Result<Bitmap, IndexError> {
        let Value::Port(port) = value else {
            return Err(IndexError::IllegalOperator);
        };
        match op {
            ClauseOp::Eq => Ok(self.equal_to(port)),
            ClauseOp::Ne => Ok(bm::and(&self.universe, &bm::not(&self.equal_to(port)))),
            _ => Err(IndexError::IllegalOperator),
        }
    }

    fn universe(&self) -> &Bitmap {
        &self.universe
    }
}

impl PortIndex {
    /// Port numbers satisfying `op` against `number`, ignoring protocol.
    /// Used by the container machinery when a clause constrains only the
    /// numeric field of a port (e.g. `port.number > 1024`).
    pub fn number_lookup(&self, op: ClauseOp, number: u16) -> Result<Bitmap, IndexError> {
        let result = match op {
            ClauseOp::Eq => self.number_equal_to(number),
            ClauseOp::Ne => bm::and(&self.universe, &bm::not(&self.number_equal_to(number))),
            ClauseOp::Lt => self.number_less_than(number),
            ClauseOp::Le => bm::or(&self.number_less_than(number), &self.number_equal_to(number)),
            ClauseOp::Gt => {
                let le = bm::or(&self.number_less_than(number), &self.number_equal_to(number));
                bm::and(&self.universe, &bm::not(&le))
            }
            ClauseOp::Ge => bm::and(&self.universe, &bm::not(&self.number_less_than(number))),
            _ => return Err(IndexError::IllegalOperator),
        };
        Ok(result)
    }

    fn number_equal_to(&self, number: u16) -> Bitmap {
        let mut result = Bitmap::ones(self.len);
        for i in 0..WIDTH {
            let want = Self::bit_of(number, i);
            let slice = &self.number_bits[i as usize];
            result = if want {
                bm::and(&result, slice)
            } else {
                bm::and(&result, &bm::not(slice))
            };
        }
        result
    }

    fn number_less_than(&self, number: u16) -> Bitmap {
        let mut result = Bitmap::zeros(self.len);
        let mut prefix_eq = Bitmap::ones(self.len);
        for i in 0..WIDTH {
            let want = Self::bit_of(number, i);
            let slice = &self.number_bits[i as usize];
            if want {
                let lt_here = bm::and(&prefix_eq, &bm::not(slice));
                result = bm::or(&result, &lt_here);
                prefix_eq = bm::and(&prefix_eq, slice);
            } else {
                prefix_eq = bm::and(&prefix_eq, &bm::not(slice));
            }
        }
        result
    }

    /// Positions whose protocol matches.
    pub fn protocol_lookup(&self, protocol: Protocol) -> Bitmap {
        self.protocol
            .get(&protocol)
            .cloned()
            .unwrap_or_else(|| Bitmap::zeros(self.len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build() -> PortIndex {
        let mut idx = PortIndex::new();
        idx.push(0, Some(&Value::Port(Port::new(80, Protocol::Tcp))))
            .unwrap();
        idx.push(1, Some(&Value::Port(Port::new(53, Protocol::Udp))))
            .unwrap();
        idx.push(2, Some(&Value::Port(Port::new(80, Protocol::Udp))))
            .unwrap();
        idx
    }

    #[test]
    fn equality_requires_both_number_and_protocol() {
        let idx = build();
        let eq = idx
            .lookup(ClauseOp::Eq, &Value::Port(Port::new(80, Protocol::Tcp)))
            .unwrap();
        assert!(eq.get(0) && !eq.get(1) && !eq.get(2));
    }

    #[test]
    fn number_lookup_ignores_protocol() {
        let idx = build();
        let eq80 = idx.number_lookup(ClauseOp::Eq, 80).unwrap();
        assert!(eq80.get(0) && !eq80.get(1) && eq80.get(2));
    }

    #[test]
    fn protocol_lookup_is_categorical() {
        let idx = build();
        let udp = idx.protocol_lookup(Protocol::Udp);
        assert!(!udp.get(0) && udp.get(1) && udp.get(2));
    }
}
