//! variables.rs — Caller-facing domains and the generation request.
//!
//! Wire tokens are explicit and stable (`high-thc`, `disposable-vape`, …).
//! `GenerationRequest` mirrors the JSON a UI layer sends: camelCase fields, every
//! knob optional except the product type.

wire_enum!(
    /// Named concentration regime selecting a Range Table row.
    ProfileType => {
        HighThc        = "high-thc",
        MediumThc      = "medium-thc",
        LowThc         = "low-thc",
        Hemp           = "hemp",
        Decarbed       = "decarbed",
        DisposableVape = "disposable-vape",
        Concentrate    = "concentrate",
        Gummy          = "gummy",
    }
);

wire_enum!(
    /// Selects the LOD/LOQ table and the unit-conversion path.
    ProductClass => {
        Flower = "flower",
        Edible = "edible",
    }
);

wire_enum!(
    /// Product selection accepted from callers; drives the default profile and class.
    ProductType => {
        Flower         = "flower",
        PreRoll        = "pre-roll",
        Concentrate    = "concentrate",
        DisposableVape = "disposable-vape",
        Edible         = "edible",
    }
);

impl ProductType {
    /// Profile used when the caller does not pick one.
    pub fn default_profile(self) -> ProfileType {
        match self {
            ProductType::Flower | ProductType::PreRoll => ProfileType::HighThc,
            ProductType::Concentrate => ProfileType::Concentrate,
            ProductType::DisposableVape => ProfileType::DisposableVape,
            ProductType::Edible => ProfileType::Gummy,
        }
    }

    pub fn product_class(self) -> ProductClass {
        match self {
            ProductType::Edible => ProductClass::Edible,
            _ => ProductClass::Flower,
        }
    }
}

impl Default for ProductType {
    fn default() -> Self {
        ProductType::Flower
    }
}

/// Caller overrides for the THCa / Δ9-THC ranges. Each bound is optional; a
/// missing bound falls back to the Range Table.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct CustomRanges {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub thca_min: Option<f64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub thca_max: Option<f64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub d9thc_min: Option<f64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub d9thc_max: Option<f64>,
}

impl CustomRanges {
    /// THCa bounds as given (unresolved against any table row).
    pub fn thca(&self) -> (Option<f64>, Option<f64>) {
        (self.thca_min, self.thca_max)
    }

    pub fn d9thc(&self) -> (Option<f64>, Option<f64>) {
        (self.d9thc_min, self.d9thc_max)
    }

    pub fn is_empty(&self) -> bool {
        self.thca_min.is_none()
            && self.thca_max.is_none()
            && self.d9thc_min.is_none()
            && self.d9thc_max.is_none()
    }
}

/// One generation call as sent by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct GenerationRequest {
    /// Explicit profile; defaults to `product_type.default_profile()`.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub profile_type: Option<ProfileType>,
    pub product_type: ProductType,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub custom_ranges: Option<CustomRanges>,
    /// Batch position; a determinism/variety hint only.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub sample_index: Option<u64>,
    /// Edible dose in mg. When set for an edible product, the dosage converter is used.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub edible_dosage: Option<f64>,
    /// Sample mass string such as `"3.5g"` or `"500mg"`.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub sample_size: Option<String>,
}

impl GenerationRequest {
    pub fn for_product(product_type: ProductType) -> Self {
        Self {
            product_type,
            ..Self::default()
        }
    }

    pub fn resolved_profile_type(&self) -> ProfileType {
        self.profile_type
            .unwrap_or_else(|| self.product_type.default_profile())
    }

    pub fn product_class(&self) -> ProductClass {
        self.product_type.product_class()
    }

    /// True when the request should go through the edible dosage converter.
    pub fn uses_dosage(&self) -> bool {
        self.product_class() == ProductClass::Edible && self.edible_dosage.is_some()
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn request_reads_camel_case() {
        let req: GenerationRequest = serde_json::from_str(
            r#"{"profileType":"hemp","productType":"pre-roll",
                "customRanges":{"thcaMin":0.1,"d9thcMax":0.2},"sampleIndex":4}"#,
        )
        .unwrap();
        assert_eq!(req.profile_type, Some(ProfileType::Hemp));
        assert_eq!(req.product_type, ProductType::PreRoll);
        assert_eq!(req.sample_index, Some(4));
        let c = req.custom_ranges.unwrap();
        assert_eq!(c.thca_min, Some(0.1));
        assert_eq!(c.d9thc_max, Some(0.2));
        assert_eq!(c.thca_max, None);
    }
}
