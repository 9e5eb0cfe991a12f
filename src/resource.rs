const ARN_FIELDS: usize = 6;

/// The parts of an `execute-api` method ARN needed to scope a policy to a
/// whole stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceArn<'a> {
    pub partition: &'a str,
    pub service: &'a str,
    pub region: &'a str,
    pub account: &'a str,
    pub api_id: &'a str,
    pub stage: &'a str,
}

impl<'a> ResourceArn<'a> {
    /// Parses `arn:{partition}:{service}:{region}:{account}:{api}/{stage}/...`.
    pub fn parse(raw: &'a str) -> Option<Self> {
        let fields: Vec<&str> = raw.splitn(ARN_FIELDS, ':').collect();
        if fields.len() < ARN_FIELDS || fields[0] != "arn" {
            return None;
        }
        let mut path = fields[5].split('/');
        let api_id = path.next().filter(|s| !s.is_empty())?;
        let stage = path.next().filter(|s| !s.is_empty())?;
        if fields[1..5].iter().any(|f| f.is_empty()) {
            return None;
        }
        Some(Self {
            partition: fields[1],
            service: fields[2],
            region: fields[3],
            account: fields[4],
            api_id,
            stage,
        })
    }

    /// Every method and path under this ARN's stage.
    pub fn wildcard(&self) -> String {
        format!(
            "arn:{}:{}:{}:{}:{}/{}/*",
            self.partition, self.service, self.region, self.account, self.api_id, self.stage
        )
    }
}

/// Resource for the returned policy statement.
///
/// Falls back to the raw identifier when it does not parse and to `*` when
/// there is none, so the policy is never malformed.
pub fn policy_resource(raw: Option<&str>) -> String {
    match raw.filter(|s| !s.trim().is_empty()) {
        None => "*".to_string(),
        Some(raw) => match ResourceArn::parse(raw) {
            Some(arn) => arn.wildcard(),
            None => raw.to_string(),
        },
    }
}
