use serde::{Deserialize, Serialize};

/// A campaign as listed by `GET /ncc/campaigns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub ncc_campaign_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_tp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn deserializes_campaign_list() {
        let campaigns: Vec<Campaign> = serde_json::from_value(json!([
            {
                "nccCampaignId": "cmp-a001-01-000000000000001",
                "customerId": 1234,
                "name": "Brand",
                "campaignTp": "WEB_SITE",
                "status": "ELIGIBLE",
                "userLock": false
            },
            { "nccCampaignId": "cmp-a001-01-000000000000002" }
        ]))
        .expect("Should deserialize campaigns");

        assert_eq!(2, campaigns.len());
        assert_eq!("Brand", campaigns[0].name);
        assert_eq!(Some("WEB_SITE".to_string()), campaigns[0].campaign_tp);
        assert_eq!("", campaigns[1].name);
        assert_eq!(None, campaigns[1].status);
    }
}
