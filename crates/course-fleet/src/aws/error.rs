//! Classifying AWS failures by error code
//!
//! Workflows only branch on a handful of provider outcomes (a group that is
//! already gone, an instance not yet visible, a rejected DNS batch). Those are
//! recognised from the SDK's `.code()` and surfaced as [`AwsError`].

use thiserror::Error;

/// Provider failures the workflows can tell apart
#[derive(Debug, Clone, Error)]
pub enum AwsError {
    /// The named resource does not exist
    #[error("{resource_type} not found: {resource_id}")]
    NotFound {
        resource_type: &'static str,
        resource_id: String,
    },

    /// A resource with the same name exists (e.g. the course security group)
    #[error("Resource already exists: {message}")]
    AlreadyExists { message: String },

    /// Resource is still referenced (e.g. a security group attached to an ENI)
    #[error("Resource still in use: {message}")]
    DependencyViolation { message: String },

    /// Route 53 rejected a change batch
    #[error("Invalid DNS change batch: {message}")]
    InvalidChangeBatch { message: String },

    /// Anything else the provider reported
    #[error("AWS error{}: {message}", .code.as_deref().map(|c| format!(" ({c})")).unwrap_or_default())]
    Sdk {
        code: Option<String>,
        message: String,
    },
}

impl AwsError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AwsError::NotFound { .. })
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, AwsError::AlreadyExists { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    NotFound(&'static str),
    AlreadyExists,
    DependencyViolation,
    InvalidChangeBatch,
}

/// Error codes this crate reacts to, for the EC2 and Route 53 calls it makes
const KNOWN_CODES: &[(&str, Kind)] = &[
    ("InvalidInstanceID.NotFound", Kind::NotFound("instance")),
    ("InvalidGroup.NotFound", Kind::NotFound("security group")),
    ("InvalidPermission.NotFound", Kind::NotFound("security group rule")),
    ("NoSuchHostedZone", Kind::NotFound("hosted zone")),
    ("InvalidGroup.Duplicate", Kind::AlreadyExists),
    ("InvalidPermission.Duplicate", Kind::AlreadyExists),
    ("DependencyViolation", Kind::DependencyViolation),
    ("InvalidChangeBatch", Kind::InvalidChangeBatch),
    ("InvalidInput", Kind::InvalidChangeBatch),
];

/// Classify a provider error from its code and message.
pub fn classify_aws_error(code: Option<&str>, message: Option<&str>) -> AwsError {
    let message = message.unwrap_or("no message provided").to_string();
    let kind = code.and_then(|c| {
        KNOWN_CODES
            .iter()
            .find(|(known, _)| *known == c)
            .map(|(_, kind)| *kind)
    });

    match kind {
        Some(Kind::NotFound(resource_type)) => AwsError::NotFound {
            resource_type,
            resource_id: message,
        },
        Some(Kind::AlreadyExists) => AwsError::AlreadyExists { message },
        Some(Kind::DependencyViolation) => AwsError::DependencyViolation { message },
        Some(Kind::InvalidChangeBatch) => AwsError::InvalidChangeBatch { message },
        None => AwsError::Sdk {
            code: code.map(str::to_string),
            message,
        },
    }
}

/// Classify the first AWS failure found in an error chain.
///
/// An [`AwsError`] already in the chain is returned as is; SDK errors for the
/// operations this crate issues are classified through
/// `ProvideErrorMetadata`. Anything else becomes [`AwsError::Sdk`] without a
/// code.
pub fn classify_anyhow_error(error: &anyhow::Error) -> AwsError {
    use aws_sdk_ec2::error::ProvideErrorMetadata;
    use aws_sdk_ec2::error::SdkError as Ec2SdkError;
    use aws_sdk_ec2::operation as ec2_op;
    use aws_sdk_route53::error::SdkError as Route53SdkError;
    use aws_sdk_route53::operation as r53_op;

    macro_rules! classify_sdk {
        ($cause:expr, $($ty:ty),+ $(,)?) => {
            $(
                if let Some(e) = $cause.downcast_ref::<$ty>() {
                    return classify_aws_error(e.code(), e.message());
                }
            )+
        };
    }

    for cause in error.chain() {
        if let Some(e) = cause.downcast_ref::<AwsError>() {
            return e.clone();
        }

        classify_sdk!(
            cause,
            Ec2SdkError<ec2_op::describe_images::DescribeImagesError>,
            Ec2SdkError<ec2_op::run_instances::RunInstancesError>,
            Ec2SdkError<ec2_op::describe_instances::DescribeInstancesError>,
            Ec2SdkError<ec2_op::terminate_instances::TerminateInstancesError>,
            Ec2SdkError<ec2_op::create_security_group::CreateSecurityGroupError>,
            Ec2SdkError<ec2_op::delete_security_group::DeleteSecurityGroupError>,
            Ec2SdkError<ec2_op::authorize_security_group_ingress::AuthorizeSecurityGroupIngressError>,
            Route53SdkError<r53_op::list_hosted_zones_by_name::ListHostedZonesByNameError>,
            Route53SdkError<r53_op::list_resource_record_sets::ListResourceRecordSetsError>,
            Route53SdkError<r53_op::change_resource_record_sets::ChangeResourceRecordSetsError>,
        );
    }

    AwsError::Sdk {
        code: None,
        message: error.to_string(),
    }
}
