extern crate fnv;

use fnv::FnvHashMap;

/// Maps the raw string identifiers from the input data to consecutive integer
/// ids and keeps basic statistics needed for allocation.
pub struct DataDictionary {
    user_dict: FnvHashMap<String, u32>,
    item_dict: FnvHashMap<String, u32>,
    num_interactions: u64,
}

impl DataDictionary {

    pub fn num_users(&self) -> usize {
        self.user_dict.len()
    }

    pub fn num_items(&self) -> usize {
        self.item_dict.len()
    }

    pub fn num_interactions(&self) -> u64 {
        self.num_interactions
    }

    pub fn user_index(&self, name: &str) -> &u32 {
        self.user_dict.get(name).unwrap()
    }

    pub fn item_index(&self, name: &str) -> &u32 {
        self.item_dict.get(name).unwrap()
    }
}

impl<'a, T> From<T> for DataDictionary where T: Iterator<Item = &'a (String, String)> {

    fn from(interactions: T) -> Self {

        let mut user_index: u32 = 0;
        let mut user_dict: FnvHashMap<String, u32> =
            FnvHashMap::with_capacity_and_hasher(100, Default::default());

        let mut item_index: u32 = 0;
        let mut item_dict: FnvHashMap<String, u32> =
            FnvHashMap::with_capacity_and_hasher(100, Default::default());

        let mut num_interactions: u64 = 0;

        for &(ref user, ref item) in interactions {

            if !user_dict.contains_key(user) {
                user_dict.insert(user.clone(), user_index);
                user_index += 1;
            }

            if !item_dict.contains_key(item) {
                item_dict.insert(item.clone(), item_index);
                item_index += 1;
            }

            num_interactions += 1;
        }

        DataDictionary { user_dict, item_dict, num_interactions }
    }
}

/// Mean and sample standard deviation of a metric over repeated evaluation
/// runs of a retrained model.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Summary {
    pub mean: f64,
    pub std: f64,
}

pub fn describe(values: &[f64]) -> Summary {

    if values.is_empty() {
        return Summary { mean: 0.0, std: 0.0 };
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;

    let std = if values.len() < 2 {
        0.0
    } else {
        let squared_deviations: f64 = values.iter()
            .map(|value| (value - mean) * (value - mean))
            .sum();

        (squared_deviations / (n - 1.0)).sqrt()
    };

    Summary { mean, std }
}
