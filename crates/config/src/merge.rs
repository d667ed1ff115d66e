// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recursive merge of parsed YAML trees.
//!
//! Later values override earlier ones. Sequences are replaced wholesale,
//! except the top-level `services` sequence, which is appended, matching
//! the original loader's special case for multi-file service definitions.

use serde_yaml::Value;

/// Merges `override_doc` into `base`, consuming both.
pub fn merge(base: Value, override_doc: Value) -> Value {
    match (base, override_doc) {
        (Value::Mapping(mut base_map), Value::Mapping(override_map)) => {
            for (key, value) in override_map {
                let is_services = matches!(&key, Value::String(s) if s == "services");
                if is_services {
                    if let Value::Sequence(override_seq) = value {
                        match base_map.get_mut(&key) {
                            Some(Value::Sequence(base_seq)) => base_seq.extend(override_seq),
                            _ => {
                                base_map.insert(key, Value::Sequence(override_seq));
                            }
                        }
                        continue;
                    }
                    base_map.insert(key, value);
                    continue;
                }

                match base_map.get(&key).cloned() {
                    Some(existing @ Value::Mapping(_)) if value.is_mapping() => {
                        base_map.insert(key, merge(existing, value));
                    }
                    _ => {
                        base_map.insert(key, value);
                    }
                }
            }
            Value::Mapping(base_map)
        }
        (_, override_doc) => override_doc,
    }
}
