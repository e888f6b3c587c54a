//! Sensors - encode real-world values into sparse binary representations.
//!
//! Sensors are pure encoders over [`Bitset`]: external collaborators of the
//! region engine that turn scalars and category labels into the bit
//! patterns a region consumes, and decode region output back into values.

use fxhash::FxHashMap;

use crate::bitset::Bitset;
use crate::error::{CorticalError, Result};

/// A sensor that encodes values of type `T` into a fixed-length bitset.
pub trait Encoder<T> {
    /// Encode `value`, replacing the current bits. Fails with an encode
    /// error when the value is outside the sensor's domain.
    fn encode(&mut self, value: T) -> Result<()>;

    /// The bits of the last encoded value.
    fn get(&self) -> &Bitset;
}

/// Encodes a scalar range into overlapping buckets of `w` contiguous bits.
///
/// Bucket `b` covers the half-open value interval
/// `[min + b * bucket_size, min + (b + 1) * bucket_size)`; neighboring
/// buckets share `w - 1` bits, so nearby values get similar patterns.
///
/// # Examples
///
/// ```
/// use cortical::{Encoder, ScalarSensor};
///
/// let mut sensor = ScalarSensor::new(64, 2, -100.0, 100.0).unwrap();
/// sensor.encode(-100.0).unwrap();
/// assert!(Encoder::<f64>::get(&sensor).all_set(&[0, 1]));
/// assert_eq!(sensor.decode_int(Encoder::<f64>::get(&sensor)), Some(-99));
/// ```
pub struct ScalarSensor {
    /// The number of bits this sensor produces for each input.
    pub n: usize,
    /// The number of bits set for each input.
    pub w: usize,
    /// Lowest encodable value (inclusive).
    pub min_value: f64,
    /// Highest encodable value (exclusive).
    pub max_value: f64,
    /// Width of one bucket, in value units.
    pub bucket_size: f64,

    value: Bitset,
}

impl ScalarSensor {
    /// Create a scalar sensor over `[min, max)` with `n` bits, `w` of them
    /// set per value. Fails when the range is too small for the number of
    /// buckets.
    pub fn new(n: usize, w: usize, min: f64, max: f64) -> Result<Self> {
        let bucket_size = (max - min) / (n - w + 1) as f64;
        if bucket_size < 1.0 {
            return Err(CorticalError::Config(format!(
                "not enough buckets for [{}, {}) over {} bits: increase the range or decrease the length",
                min, max, n
            )));
        }
        Ok(Self {
            n,
            w,
            min_value: min,
            max_value: max,
            bucket_size,
            value: Bitset::new(n),
        })
    }

    /// The midpoint of the bucket indicated by the first set bit, or
    /// `None` when no bit is set.
    pub fn decode(&self, bits: &Bitset) -> Option<f64> {
        bits.iter_set()
            .next()
            .map(|bucket| (0.5 + bucket as f64) * self.bucket_size + self.min_value)
    }

    /// [`decode`], rounded down to an integer.
    ///
    /// [`decode`]: ScalarSensor::decode
    pub fn decode_int(&self, bits: &Bitset) -> Option<i64> {
        self.decode(bits).map(|v| v.floor() as i64)
    }
}

impl Encoder<f64> for ScalarSensor {
    fn encode(&mut self, value: f64) -> Result<()> {
        self.value.reset();
        if value < self.min_value || value >= self.max_value {
            return Err(CorticalError::Encode(format!(
                "value {} outside [{}, {})",
                value, self.min_value, self.max_value
            )));
        }
        let bucket = ((value - self.min_value) / self.bucket_size).floor() as usize;
        self.value.set_range(bucket, bucket + self.w)?;
        Ok(())
    }

    fn get(&self) -> &Bitset {
        &self.value
    }
}

impl Encoder<i64> for ScalarSensor {
    fn encode(&mut self, value: i64) -> Result<()> {
        Encoder::<f64>::encode(self, value as f64)
    }

    fn get(&self) -> &Bitset {
        &self.value
    }
}

/// Encodes enumerated labels into disjoint `w`-bit ranges.
pub struct CategorySensor {
    /// The number of bits this sensor produces for each input.
    pub n: usize,
    /// The number of bits set for each input.
    pub w: usize,

    categories: FxHashMap<String, usize>,
    labels: Vec<String>,
    value: Bitset,
}

impl CategorySensor {
    /// Create a category sensor with one disjoint `w`-bit range per label.
    /// Fails when `n` bits cannot hold all ranges.
    pub fn new(n: usize, w: usize, labels: &[&str]) -> Result<Self> {
        if labels.len() * w > n {
            return Err(CorticalError::Config(format!(
                "{} categories of {} bits each do not fit in {} bits",
                labels.len(),
                w,
                n
            )));
        }
        let mut categories = FxHashMap::default();
        for (i, &label) in labels.iter().enumerate() {
            categories.insert(label.to_string(), i + 1);
        }
        Ok(Self {
            n,
            w,
            categories,
            labels: labels.iter().map(|&l| l.to_string()).collect(),
            value: Bitset::new(n),
        })
    }

    /// The label of the range indicated by the first set bit.
    pub fn decode(&self, bits: &Bitset) -> Option<&str> {
        bits.iter_set()
            .next()
            .and_then(|found| self.labels.get(found / self.w))
            .map(String::as_str)
    }
}

impl Encoder<&str> for CategorySensor {
    fn encode(&mut self, value: &str) -> Result<()> {
        self.value.reset();
        let id = *self.categories.get(value).ok_or_else(|| {
            CorticalError::Encode(format!("unknown category \"{}\"", value))
        })?;
        self.value.set_range((id - 1) * self.w, id * self.w)?;
        Ok(())
    }

    fn get(&self) -> &Bitset {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_encoder() {
        let mut sensor = ScalarSensor::new(6, 2, 0.0, 10.0).unwrap();
        let cases: &[(i64, [usize; 2])] = &[
            (0, [0, 1]),
            (1, [0, 1]),
            (2, [1, 2]),
            (3, [1, 2]),
            (4, [2, 3]),
            (5, [2, 3]),
            (6, [3, 4]),
            (7, [3, 4]),
            (8, [4, 5]),
            (9, [4, 5]),
        ];
        for &(value, expected) in cases {
            sensor.encode(value).unwrap();
            assert!(
                Encoder::<i64>::get(&sensor).all_set(&expected),
                "encode({}) => {}",
                value,
                Encoder::<i64>::get(&sensor)
            );
            assert_eq!(Encoder::<i64>::get(&sensor).num_set_bits(), 2);
        }
        assert!(sensor.encode(10).is_err());
    }

    #[test]
    fn test_int_encoder() {
        let mut sensor = ScalarSensor::new(64, 2, -100.0, 100.0).unwrap();
        assert_eq!(sensor.bucket_size, 200.0 / 63.0);

        // The first bucket covers [-100, -98).
        let mut expected = Bitset::new(64);
        expected.set_range(0, 2).unwrap();
        for value in [-100, -99, -98] {
            sensor.encode(value).unwrap();
            assert_eq!(*Encoder::<i64>::get(&sensor), expected, "encode({})", value);
        }
        assert_eq!(sensor.decode_int(&expected), Some(-99));

        // The next bucket corresponds to [-97, -95).
        expected.reset();
        expected.set_range(1, 3).unwrap();
        assert_eq!(sensor.decode_int(&expected), Some(-96));

        // The last bucket covers [98, 100).
        expected.reset();
        expected.set_range(62, 64).unwrap();
        sensor.encode(99).unwrap();
        assert_eq!(*Encoder::<i64>::get(&sensor), expected);
        assert_eq!(sensor.decode_int(&expected), Some(98));
    }

    #[test]
    fn test_float_decode_is_bucket_midpoint() {
        let mut sensor = ScalarSensor::new(64, 3, -100.0, 100.0).unwrap();
        sensor.encode(-100.0).unwrap();
        let decoded = sensor.decode(Encoder::<f64>::get(&sensor)).unwrap();
        assert_eq!(decoded, -100.0 + sensor.bucket_size / 2.0);
    }

    #[test]
    fn test_decode_empty_bits() {
        let sensor = ScalarSensor::new(64, 2, -100.0, 100.0).unwrap();
        assert_eq!(sensor.decode(&Bitset::new(64)), None);
    }

    #[test]
    fn test_sensor_cannot_be_too_sparse() {
        assert!(ScalarSensor::new(2048, 3, -100.0, 100.0).is_err());
    }

    #[test]
    fn test_category_encoder() {
        let mut sensor = CategorySensor::new(64, 4, &["A", "B", "C"]).unwrap();

        sensor.encode("A").unwrap();
        let mut expected = Bitset::new(64);
        expected.set_range(0, 4).unwrap();
        assert_eq!(*sensor.get(), expected);
        assert_eq!(sensor.decode(&expected), Some("A"));

        sensor.encode("B").unwrap();
        expected.reset();
        expected.set_range(4, 8).unwrap();
        assert_eq!(*sensor.get(), expected);
        assert_eq!(sensor.decode(&expected), Some("B"));

        assert!(sensor.encode("Other").is_err());
    }

    #[test]
    fn test_category_sensor_capacity() {
        assert!(CategorySensor::new(8, 4, &["A", "B", "C"]).is_err());
        assert!(CategorySensor::new(12, 4, &["A", "B", "C"]).is_ok());
    }
}
