//! NetCDF file reader.
//!
//! Reads the root group of a NetCDF file into a [`Dataset`], decoding the
//! usual CF conventions on the way: fill and missing values become NaN,
//! `scale_factor`/`add_offset` are applied, and names listed in a
//! `coordinates` attribute are flagged as coordinates.

use super::{Dataset, Variable};
use crate::error::{EkmanError, Result};
use ndarray::{ArrayD, IxDyn};
use netcdf::types::{FloatType, IntType, NcVariableType};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// NetCDF data reader.
#[derive(Debug)]
pub struct DataReader;

impl DataReader {
    /// Read a NetCDF file.
    pub fn read_file(path: &Path) -> Result<Dataset> {
        if !path.exists() {
            return Err(EkmanError::file_open(
                path.to_path_buf(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            ));
        }
        let file = netcdf::open(path)?;

        let mut dataset = Dataset::new();
        dataset.source = Some(path.to_path_buf());
        for attr in file.attributes() {
            dataset
                .attrs
                .insert(attr.name().to_string(), Self::attr_value_to_string(&attr));
        }

        let mut listed_coords: Vec<String> = Vec::new();
        for var in file.variables() {
            let Some(variable) = Self::read_variable(&var)? else {
                continue;
            };
            if let Some(coords) = variable.attrs.get("coordinates") {
                listed_coords.extend(coords.split_whitespace().map(String::from));
            }
            dataset.insert(variable)?;
        }

        listed_coords.sort();
        listed_coords.dedup();
        listed_coords.retain(|c| dataset.contains(c));
        dataset.set_coords(&listed_coords);

        info!(
            path = %path.display(),
            variables = dataset.variable_names().len(),
            dims = dataset.dims().len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    /// Read one variable. Text variables cannot be explored and are skipped.
    fn read_variable(var: &netcdf::Variable<'_>) -> Result<Option<Variable>> {
        let name = var.name();
        let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
        let dims: Vec<String> = var
            .dimensions()
            .iter()
            .map(|d| d.name().to_string())
            .collect();

        let mut attrs = BTreeMap::new();
        for attr in var.attributes() {
            attrs.insert(attr.name().to_string(), Self::attr_value_to_string(&attr));
        }

        let Some(mut values) = read_variable_array(var, &shape)? else {
            debug!(variable = %name, "skipping non-numeric variable");
            return Ok(None);
        };
        decode_cf(&mut values, &attrs);

        let dtype = format!("{:?}", var.vartype())
            .replace("NcVariableType::", "")
            .to_lowercase();
        let dim_refs: Vec<&str> = dims.iter().map(String::as_str).collect();
        let mut variable = Variable::new(name, &dim_refs, values)?.with_dtype(dtype);
        variable.attrs = attrs;
        Ok(Some(variable))
    }

    fn attr_value_to_string(attr: &netcdf::Attribute<'_>) -> String {
        use netcdf::AttributeValue;

        match attr.value() {
            Ok(AttributeValue::Uchar(v)) => format!("{}", v),
            Ok(AttributeValue::Schar(v)) => format!("{}", v),
            Ok(AttributeValue::Ushort(v)) => format!("{}", v),
            Ok(AttributeValue::Short(v)) => format!("{}", v),
            Ok(AttributeValue::Uint(v)) => format!("{}", v),
            Ok(AttributeValue::Int(v)) => format!("{}", v),
            Ok(AttributeValue::Ulonglong(v)) => format!("{}", v),
            Ok(AttributeValue::Longlong(v)) => format!("{}", v),
            Ok(AttributeValue::Float(v)) => format!("{}", v),
            Ok(AttributeValue::Double(v)) => format!("{}", v),
            Ok(AttributeValue::Str(v)) => v,
            Ok(AttributeValue::Uchars(v)) => format!("{:?}", v),
            Ok(AttributeValue::Schars(v)) => format!("{:?}", v),
            Ok(AttributeValue::Ushorts(v)) => format!("{:?}", v),
            Ok(AttributeValue::Shorts(v)) => format!("{:?}", v),
            Ok(AttributeValue::Uints(v)) => format!("{:?}", v),
            Ok(AttributeValue::Ints(v)) => format!("{:?}", v),
            Ok(AttributeValue::Ulonglongs(v)) => format!("{:?}", v),
            Ok(AttributeValue::Longlongs(v)) => format!("{:?}", v),
            Ok(AttributeValue::Floats(v)) => format!("{:?}", v),
            Ok(AttributeValue::Doubles(v)) => format!("{:?}", v),
            Ok(AttributeValue::Strs(v)) => v.join(", "),
            Err(_) => format!("{:?}", attr),
        }
    }
}

/// Mask fill values, then unpack with scale and offset.
fn decode_cf(values: &mut ArrayD<f64>, attrs: &BTreeMap<String, String>) {
    let number = |key: &str| attrs.get(key).and_then(|s| s.parse::<f64>().ok());
    let fills: Vec<f64> = ["_FillValue", "missing_value"]
        .iter()
        .filter_map(|key| number(key))
        .collect();
    if !fills.is_empty() {
        values.mapv_inplace(|v| if fills.contains(&v) { f64::NAN } else { v });
    }

    let scale_factor = number("scale_factor").unwrap_or(1.0);
    let add_offset = number("add_offset").unwrap_or(0.0);
    if scale_factor != 1.0 || add_offset != 0.0 {
        values.mapv_inplace(|v| v * scale_factor + add_offset);
    }
}

/// Read numeric data widened to f64. `None` for text variables.
fn read_variable_array(var: &netcdf::Variable<'_>, shape: &[usize]) -> Result<Option<ArrayD<f64>>> {
    let vartype = var.vartype();

    let from_vec = |v: Vec<f64>| -> Result<Option<ArrayD<f64>>> {
        ArrayD::from_shape_vec(IxDyn(shape), v)
            .map(Some)
            .map_err(|e| EkmanError::shape_mismatch(var.name(), e.to_string()))
    };
    let read_err = |kind: &str, e: netcdf::Error| {
        EkmanError::NetCDF(format!("Failed to read {} data of '{}': {}", kind, var.name(), e))
    };

    match vartype {
        NcVariableType::Float(FloatType::F64) => {
            let values: Vec<f64> = var.get_values(..).map_err(|e| read_err("f64", e))?;
            from_vec(values)
        },
        NcVariableType::Float(FloatType::F32) => {
            let values: Vec<f32> = var.get_values(..).map_err(|e| read_err("f32", e))?;
            from_vec(values.into_iter().map(f64::from).collect())
        },
        NcVariableType::Int(IntType::I64) => {
            let values: Vec<i64> = var.get_values(..).map_err(|e| read_err("i64", e))?;
            from_vec(values.into_iter().map(|x| x as f64).collect())
        },
        NcVariableType::Int(IntType::I32) => {
            let values: Vec<i32> = var.get_values(..).map_err(|e| read_err("i32", e))?;
            from_vec(values.into_iter().map(f64::from).collect())
        },
        NcVariableType::Int(IntType::I16) => {
            let values: Vec<i16> = var.get_values(..).map_err(|e| read_err("i16", e))?;
            from_vec(values.into_iter().map(f64::from).collect())
        },
        NcVariableType::Int(IntType::I8) => {
            let values: Vec<i8> = var.get_values(..).map_err(|e| read_err("i8", e))?;
            from_vec(values.into_iter().map(f64::from).collect())
        },
        NcVariableType::Int(IntType::U64) => {
            let values: Vec<u64> = var.get_values(..).map_err(|e| read_err("u64", e))?;
            from_vec(values.into_iter().map(|x| x as f64).collect())
        },
        NcVariableType::Int(IntType::U32) => {
            let values: Vec<u32> = var.get_values(..).map_err(|e| read_err("u32", e))?;
            from_vec(values.into_iter().map(f64::from).collect())
        },
        NcVariableType::Int(IntType::U16) => {
            let values: Vec<u16> = var.get_values(..).map_err(|e| read_err("u16", e))?;
            from_vec(values.into_iter().map(f64::from).collect())
        },
        NcVariableType::Int(IntType::U8) => {
            let values: Vec<u8> = var.get_values(..).map_err(|e| read_err("u8", e))?;
            from_vec(values.into_iter().map(f64::from).collect())
        },
        NcVariableType::Char | NcVariableType::String => Ok(None),
        _ => Err(EkmanError::NetCDF(format!(
            "Unsupported variable type: {:?}",
            vartype
        ))),
    }
}
