use serde::{Deserialize, Serialize};

/// A sales executive whose requests land with the reviewing manager.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reportee {
    #[serde(rename = "SE_Id")]
    pub se_id: i64,
    #[serde(rename = "SE_UserName")]
    pub se_user_name: String,
    #[serde(rename = "ABM_Id")]
    pub abm_id: i64,
    #[serde(rename = "ABM_UserName")]
    pub abm_user_name: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::Reportee;

    #[test]
    fn uses_store_column_names_on_the_wire() {
        let reportee = Reportee {
            se_id: 7,
            se_user_name: "se.arjun".to_string(),
            abm_id: 3,
            abm_user_name: "abm.meera".to_string(),
        };

        assert_eq!(
            serde_json::to_value(&reportee).expect("serialize"),
            json!({"SE_Id": 7, "SE_UserName": "se.arjun", "ABM_Id": 3, "ABM_UserName": "abm.meera"})
        );
    }
}
