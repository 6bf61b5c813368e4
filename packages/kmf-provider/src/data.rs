#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseData {
    pub name: String,
    pub tag_name: String,
    pub assets: Vec<AssetData>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetData {
    pub file_name: String,
    pub file_type: String,
    pub download_url: String,
}

impl ReleaseData {
    /// First asset, in release order, whose file name ends with `suffix`.
    pub fn find_asset_by_suffix(&self, suffix: &str) -> Option<&AssetData> {
        self.assets
            .iter()
            .find(|asset| asset.file_name.ends_with(suffix))
    }
}
