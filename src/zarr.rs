use crate::error::{Error, Result};
use crate::path_utils::S3Uri;
use crate::storage::ObjectStore;
use serde::Deserialize;

const ZARR_V2_META: &str = ".zarray";
const ZARR_V3_META: &str = "zarr.json";

#[derive(Debug, Deserialize)]
struct ArrayMeta {
    shape: Vec<u64>,
}

/// Shape of the array rooted at `uri`, from `.zarray` or else `zarr.json`.
pub fn read_array_shape<S>(store: &S, uri: &S3Uri) -> Result<Vec<u64>>
where
    S: ObjectStore + ?Sized,
{
    let v2 = uri.join(ZARR_V2_META);
    let bytes = match store.read_object(&v2.bucket, &v2.key) {
        Ok(b) => b,
        Err(Error::ObjectNotFound { .. }) => {
            let v3 = uri.join(ZARR_V3_META);
            store.read_object(&v3.bucket, &v3.key)?
        }
        Err(e) => return Err(e),
    };
    let meta: ArrayMeta = serde_json::from_slice(&bytes)?;
    Ok(meta.shape)
}
