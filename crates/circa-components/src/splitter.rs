//! Splitter construction.
//!
//! A splitter is not a leaf behaviour: the connectivity analyzer sews
//! its bits straight into wire threads. This module only builds the
//! [`SplitterSpec`] bit map, either spread evenly over the fan-out ends
//! or given explicitly.
//!
//! Constructed via the builder pattern: [`SplitterBuilder::new`].

use circa_circuit::{Component, SplitterSpec};
use circa_core::{BitWidth, Location};

/// Spread `bits` combined bits over `fan_out` ends in contiguous runs,
/// lowest bits on end 1. Earlier ends take one extra bit when the bits
/// do not divide evenly; with more ends than bits each bit gets its own
/// end and the rest stay empty.
pub fn even_distribution(fan_out: usize, bits: usize) -> Vec<u8> {
    if fan_out == 0 {
        return vec![0; bits];
    }
    if fan_out >= bits {
        return (1..=bits).map(|e| e as u8).collect();
    }
    let per_end = bits / fan_out;
    let mut extra = bits % fan_out;
    let mut map = Vec::with_capacity(bits);
    let mut end = 0u8;
    let mut left = 0;
    for _ in 0..bits {
        if left == 0 {
            end += 1;
            left = per_end;
            if extra > 0 {
                left += 1;
                extra -= 1;
            }
        }
        map.push(end);
        left -= 1;
    }
    map
}

/// Builder for a splitter [`Component`].
///
/// ```ignore
/// let splitter = SplitterBuilder::new(Location::new(0, 0), BitWidth::bits(4))
///     .fan_out(vec![Location::new(20, -10), Location::new(20, 10)])
///     .build()?;
/// ```
#[derive(Clone, Debug)]
pub struct SplitterBuilder {
    combined: Location,
    width: BitWidth,
    fan_out: Vec<Location>,
    bit_map: Option<Vec<u8>>,
}

impl SplitterBuilder {
    /// Start a splitter whose combined end sits at `combined`.
    pub fn new(combined: Location, width: BitWidth) -> Self {
        Self {
            combined,
            width,
            fan_out: Vec::new(),
            bit_map: None,
        }
    }

    /// Locations of fan-out ends 1, 2, ...
    pub fn fan_out(mut self, ends: Vec<Location>) -> Self {
        self.fan_out = ends;
        self
    }

    /// Explicit map: entry `i` is the end (1-based) carrying combined
    /// bit `i`, or 0 to leave the bit unconnected.
    pub fn bit_map(mut self, map: Vec<u8>) -> Self {
        self.bit_map = Some(map);
        self
    }

    /// Validate and build the component.
    pub fn build(self) -> Result<Component, String> {
        if !self.width.is_known() {
            return Err("splitter width must be known".into());
        }
        if self.fan_out.is_empty() {
            return Err("splitter needs at least one fan-out end".into());
        }
        if self.fan_out.len() > usize::from(u8::MAX) {
            return Err(format!(
                "splitter has {} fan-out ends, at most {} supported",
                self.fan_out.len(),
                u8::MAX
            ));
        }
        let bits = usize::from(self.width.width());
        let map = match self.bit_map {
            Some(map) => {
                if map.len() != bits {
                    return Err(format!(
                        "bit map has {} entries for a {bits}-bit splitter",
                        map.len()
                    ));
                }
                if let Some(&bad) = map.iter().find(|&&e| usize::from(e) > self.fan_out.len()) {
                    return Err(format!(
                        "bit map names end {bad}, splitter has {} fan-out ends",
                        self.fan_out.len()
                    ));
                }
                map
            }
            None => even_distribution(self.fan_out.len(), bits),
        };
        Ok(Component::splitter(SplitterSpec::new(
            self.combined,
            self.width,
            self.fan_out,
            map,
        )))
    }
}
