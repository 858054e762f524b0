//! Bit-sliced address index, IPv4 and IPv6 sharing a 128-bit layout
//! (§4.3).

use std::collections::HashMap;

use vast_bitmap::{self as bm, Bitmap};
use vast_value::{Address, Value};

use crate::error::IndexError;
use crate::op::ClauseOp;
use crate::value_index::ValueIndex;

const WIDTH: u32 = 128;

pub struct AddressIndex {
    universe: Bitmap,
    equality: HashMap<u128, Bitmap>,
    /// `bits[i]` carries bit `i` (MSB-first) of the address's 128-bit
    /// storage for every position pushed so far.
    bits: Vec<Bitmap>,
    len: u64,
}

impl AddressIndex {
    pub fn new() -> Self {
        Self {
            universe: Bitmap::new(),
            equality: HashMap::new(),
            bits: (0..WIDTH).map(|_| Bitmap::new()).collect(),
            len: 0,
        }
    }

    fn equal_to(&self, key: u128) -> Bitmap {
        self.equality
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Bitmap::zeros(self.len))
    }
}

impl Default for AddressIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueIndex for AddressIndex {
    fn push(&mut self, position: u64, value: Option<&Value>) -> Result<(), IndexError> {
        if position != self.len {
            return Err(IndexError::OutOfOrder {
                expected: self.len,
                actual: position,
            });
        }
        match value {
            Some(Value::Address(addr)) => {
                self.universe.append_bits(true, 1);
                for i in 0..WIDTH {
                    self.bits[i as usize].append_bits(addr.bit(i), 1);
                }
                let key = addr.bits();
                for (k, eq_bm) in self.equality.iter_mut() {
                    eq_bm.append_bits(*k == key, 1);
                }
                self.equality
                    .entry(key)
                    .or_insert_with(|| Bitmap::zeros(self.len))
                    .append_bits(true, 1);
            }
            Some(other) => {
                return Err(IndexError::TypeMismatch {
                    expected: "address",
                    actual: other.type_tag(),
                })
            }
            None => {
                self.universe.append_bits(false, 1);
                for i in 0..WIDTH {
                    self.bits[i as usize].append_bits(false, 1);
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
        match (op, value) {
            (ClauseOp::Eq, Value::Address(a)) => Ok(self.equal_to(a.bits())),
            (ClauseOp::Ne, Value::Address(a)) => {
                Ok(bm::and(&self.universe, &bm::not(&self.equal_to(a.bits()))))
            }
            (ClauseOp::In, Value::Subnet(s)) => Ok(bm::and(&self.universe, &self.in_subnet(s))),
            (ClauseOp::NotIn, Value::Subnet(s)) => {
                Ok(bm::and(&self.universe, &bm::not(&self.in_subnet(s))))
            }
            _ => Err(IndexError::IllegalOperator),
        }
    }

    fn universe(&self) -> &Bitmap {
        &self.universe
    }
}

impl AddressIndex {
    /// AND together the bit-slices implied by the subnet's prefix
    /// (§4.3: "`in subnet` evaluates by ANDing the bit-slices that match
    /// the prefix").
    fn in_subnet(&self, subnet: &vast_value::Subnet) -> Bitmap {
        let network = subnet.network();
        let prefix = subnet.prefix_len() as u32;
        let mut result = Bitmap::ones(self.len);
        for i in 0..prefix {
            let want = network.bit(i);
            let slice = &self.bits[i as usize];
            result = if want {
                bm::and(&result, slice)
            } else {
                bm::and(&result, &bm::not(slice))
            };
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vast_value::{Address, Subnet};

    #[test]
    fn scenario_three_from_spec_subnet_membership() {
        let mut idx = AddressIndex::new();
        for addr in ["192.168.1.5", "192.168.1.5", "10.0.0.1"] {
            let i = idx.len;
            idx.push(i, Some(&Value::Address(Address::parse(addr).unwrap())))
                .unwrap();
        }
        let bitmap = idx
            .lookup(
                ClauseOp::In,
                &Value::Subnet(Subnet::parse("192.168.0.0/16").unwrap()),
            )
            .unwrap();
        assert!(bitmap.get(0));
        assert!(bitmap.get(1));
        assert!(!bitmap.get(2));
    }

    #[test]
    fn not_in_is_the_complement() {
        let mut idx = AddressIndex::new();
        idx.push(0, Some(&Value::Address(Address::parse("192.168.1.5").unwrap())))
            .unwrap();
        idx.push(1, Some(&Value::Address(Address::parse("10.0.0.1").unwrap())))
            .unwrap();
        let bitmap = idx
            .lookup(
                ClauseOp::NotIn,
                &Value::Subnet(Subnet::parse("192.168.0.0/16").unwrap()),
            )
            .unwrap();
        assert!(!bitmap.get(0));
        assert!(bitmap.get(1));
    }

    #[test]
    fn equality_by_exact_address() {
        let mut idx = AddressIndex::new();
        idx.push(0, Some(&Value::Address(Address::parse("10.0.0.1").unwrap())))
            .unwrap();
        idx.push(1, Some(&Value::Address(Address::parse("10.0.0.2").unwrap())))
            .unwrap();
        let eq = idx
            .lookup(ClauseOp::Eq, &Value::Address(Address::parse("10.0.0.1").unwrap()))
            .unwrap();
        assert!(eq.get(0) && !eq.get(1));
    }
}
