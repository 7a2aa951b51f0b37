//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Binary tree over the scene primitives' bounding boxes. The tree borrows the
//! primitives from the scene; it is built once per render and only read while
//! workers trace.

use crate::{IntersectInfo, Traceable};
use raymond_math::{Aabb, Interval, Ray, Vec3};

/// Maximum primitives per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 4;

/// BVH node - either a branch with two children or a leaf with primitives.
enum BvhNode<'a> {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode<'a>>,
        right: Box<BvhNode<'a>>,
        bbox: Aabb,
    },
    /// Leaf node with a small number of primitives.
    Leaf {
        objects: Vec<&'a dyn Traceable>,
        bbox: Aabb,
    },
    /// Empty tree.
    Empty,
}

/// Primitive reference with its box and centroid cached for construction.
struct BuildItem<'a> {
    object: &'a dyn Traceable,
    bbox: Aabb,
    centroid: Vec3,
}

/// BVH over a set of primitives.
///
/// Primitives with non-finite bounds (infinite planes) cannot be placed in the
/// tree; they are kept in a side list that every query tests directly.
pub struct Bvh<'a> {
    root: BvhNode<'a>,
    unbounded: Vec<&'a dyn Traceable>,
    len: usize,
}

impl<'a> Bvh<'a> {
    /// Build a BVH from primitive references.
    pub fn build(objects: impl IntoIterator<Item = &'a dyn Traceable>) -> Self {
        let mut items = Vec::new();
        let mut unbounded = Vec::new();

        for object in objects {
            let bbox = object.aabb();
            if bbox.is_finite() {
                items.push(BuildItem {
                    object,
                    bbox,
                    centroid: bbox.centroid(),
                });
            } else {
                unbounded.push(object);
            }
        }

        let len = items.len() + unbounded.len();
        let root = if items.is_empty() {
            BvhNode::Empty
        } else {
            BvhNode::build(items)
        };

        Self { root, unbounded, len }
    }

    /// Number of primitives, bounded and unbounded.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of primitives stored outside the tree.
    pub fn unbounded_len(&self) -> usize {
        self.unbounded.len()
    }

    /// Depth of the tree (a single leaf has depth 1).
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    /// Nearest hit within `ray_t`.
    pub fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<IntersectInfo<'a>> {
        let mut closest = None;
        let mut range = ray_t;

        for &object in &self.unbounded {
            if let Some(hit) = object.trace(ray, range) {
                range = range.with_max(hit.distance);
                closest = Some(hit);
            }
        }

        if let Some(entry) = self.root.bbox().intersect(ray, range) {
            self.root.intersect(ray, entry, &mut range, &mut closest);
        }
        closest
    }

    /// True if any shadow-casting primitive is hit in `(0, max_distance)`.
    pub fn is_occluded(&self, ray: &Ray, max_distance: f32) -> bool {
        let range = Interval::forward(max_distance);
        self.unbounded.iter().any(|o| blocks(*o, ray, range)) || self.root.occluded(ray, range)
    }
}

#[inline]
fn blocks(object: &dyn Traceable, ray: &Ray, range: Interval) -> bool {
    object.material().casts_shadow() && object.test(ray, range)
}

impl<'a> BvhNode<'a> {
    /// Recursive BVH construction.
    ///
    /// Median split: sort items by centroid along the longest axis of the
    /// centroid bounds, split in half, recurse. Every split strictly shrinks
    /// both halves, so construction always terminates.
    fn build(mut items: Vec<BuildItem<'a>>) -> Self {
        let bounds = items
            .iter()
            .fold(Aabb::EMPTY, |acc, item| Aabb::surrounding(&acc, &item.bbox));

        if items.len() <= LEAF_MAX_SIZE {
            return BvhNode::Leaf {
                objects: items.into_iter().map(|item| item.object).collect(),
                bbox: bounds,
            };
        }

        let centroid_bounds = items.iter().fold(Aabb::EMPTY, |acc, item| {
            Aabb::surrounding(&acc, &Aabb::from_points(item.centroid, item.centroid))
        });
        let axis = centroid_bounds.longest_axis();

        items.sort_unstable_by(|a, b| a.centroid[axis].total_cmp(&b.centroid[axis]));

        let mid = items.len() / 2;
        let right_items = items.split_off(mid);

        BvhNode::Branch {
            left: Box::new(Self::build(items)),
            right: Box::new(Self::build(right_items)),
            bbox: bounds,
        }
    }

    fn bbox(&self) -> Aabb {
        match self {
            BvhNode::Empty => Aabb::EMPTY,
            BvhNode::Leaf { bbox, .. } | BvhNode::Branch { bbox, .. } => *bbox,
        }
    }

    fn depth(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn leaf_count(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    /// Nearest-hit descent. `entry` is where the ray enters this node's box;
    /// `range.max` shrinks to the closest hit found so far.
    fn intersect(
        &self,
        ray: &Ray,
        entry: f32,
        range: &mut Interval,
        closest: &mut Option<IntersectInfo<'a>>,
    ) {
        if entry >= range.max {
            return;
        }

        match self {
            BvhNode::Empty => {}

            BvhNode::Leaf { objects, .. } => {
                for &object in objects {
                    if let Some(hit) = object.trace(ray, *range) {
                        *range = range.with_max(hit.distance);
                        *closest = Some(hit);
                    }
                }
            }

            BvhNode::Branch { left, right, .. } => {
                let left_entry = left.bbox().intersect(ray, *range);
                let right_entry = right.bbox().intersect(ray, *range);

                // Visit the nearer child first so the farther one can be culled.
                match (left_entry, right_entry) {
                    (Some(l), Some(r)) => {
                        let (near, near_t, far, far_t) = if l <= r {
                            (left, l, right, r)
                        } else {
                            (right, r, left, l)
                        };
                        near.intersect(ray, near_t, range, closest);
                        far.intersect(ray, far_t, range, closest);
                    }
                    (Some(l), None) => left.intersect(ray, l, range, closest),
                    (None, Some(r)) => right.intersect(ray, r, range, closest),
                    (None, None) => {}
                }
            }
        }
    }

    /// Any-hit descent with early exit.
    fn occluded(&self, ray: &Ray, range: Interval) -> bool {
        match self {
            BvhNode::Empty => false,
            BvhNode::Leaf { objects, bbox } => {
                bbox.hit(ray, range) && objects.iter().any(|o| blocks(*o, ray, range))
            }
            BvhNode::Branch { left, right, bbox } => {
                bbox.hit(ray, range) && (left.occluded(ray, range) || right.occluded(ray, range))
            }
        }
    }

    #[cfg(test)]
    fn check_invariants(&self, seen: &mut Vec<*const ()>) {
        match self {
            BvhNode::Empty => {}
            BvhNode::Leaf { objects, bbox } => {
                assert!(!objects.is_empty() && objects.len() <= LEAF_MAX_SIZE);
                for o in objects {
                    assert!(bbox.contains_box(&o.aabb()));
                    seen.push(std::ptr::from_ref::<dyn Traceable>(*o).cast::<()>());
                }
            }
            BvhNode::Branch { left, right, bbox } => {
                assert_eq!(*bbox, Aabb::surrounding(&left.bbox(), &right.bbox()));
                left.check_invariants(seen);
                right.check_invariants(seen);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cuboid, Material, Plane, Scene, Sphere};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_scene(rng: &mut StdRng, n: usize) -> Scene {
        let material = Material::default().shared();
        let mut scene = Scene::default();
        for i in 0..n {
            let center = Vec3::new(
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
            );
            if i % 3 == 0 {
                let extent = Vec3::new(
                    rng.gen_range(0.1..1.0),
                    rng.gen_range(0.1..1.0),
                    rng.gen_range(0.1..1.0),
                );
                scene.add(Cuboid::new(center, extent, material.clone()));
            } else {
                scene.add(Sphere::new(center, rng.gen_range(0.1..1.2), material.clone()));
            }
        }
        scene
    }

    fn random_ray(rng: &mut StdRng) -> Ray {
        let origin = Vec3::new(
            rng.gen_range(-15.0..15.0),
            rng.gen_range(-15.0..15.0),
            rng.gen_range(-15.0..15.0),
        );
        let target = Vec3::new(
            rng.gen_range(-10.0..10.0),
            rng.gen_range(-10.0..10.0),
            rng.gen_range(-10.0..10.0),
        );
        Ray::new(origin, target - origin)
    }

    #[test]
    fn test_bvh_empty() {
        let bvh = Bvh::build(std::iter::empty());
        assert!(bvh.is_empty());
        assert_eq!(bvh.depth(), 0);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(bvh.intersect(&ray, Interval::FORWARD).is_none());
        assert!(!bvh.is_occluded(&ray, f32::INFINITY));
    }

    #[test]
    fn test_bvh_single_sphere_is_leaf() {
        let mut scene = Scene::default();
        scene.add(Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, Material::default().shared()));
        let bvh = scene.build_bvh();

        assert_eq!(bvh.leaf_count(), 1);
        assert_eq!(bvh.depth(), 1);

        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        let hit = bvh.intersect(&ray, Interval::FORWARD).expect("ray should hit");
        assert!((hit.distance - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_bvh_every_primitive_in_exactly_one_leaf() {
        let mut rng = StdRng::seed_from_u64(11);
        let scene = random_scene(&mut rng, 137);
        let bvh = scene.build_bvh();

        let mut seen = Vec::new();
        bvh.root.check_invariants(&mut seen);
        assert_eq!(seen.len(), 137);
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 137);
        assert!(bvh.depth() <= 8);
    }

    #[test]
    fn test_bvh_matches_brute_force_nearest_hit() {
        let mut rng = StdRng::seed_from_u64(42);
        let scene = random_scene(&mut rng, 200);
        let bvh = scene.build_bvh();

        let mut hits = 0;
        for _ in 0..2000 {
            let ray = random_ray(&mut rng);
            let expected = scene.intersect(&ray);
            let actual = bvh.intersect(&ray, Interval::FORWARD);

            match (expected, actual) {
                (Some(e), Some(a)) => {
                    hits += 1;
                    assert!((e.distance - a.distance).abs() < 1e-4);
                    assert!((e.position - a.position).length() < 1e-3);
                    assert!((e.normal - a.normal).length() < 1e-3);
                }
                (None, None) => {}
                (e, a) => panic!(
                    "bvh {:?} vs brute force {:?}",
                    a.map(|h| h.distance),
                    e.map(|h| h.distance)
                ),
            }
        }
        assert!(hits > 100, "too few hits to be meaningful: {hits}");
    }

    #[test]
    fn test_bvh_matches_brute_force_occlusion() {
        let mut rng = StdRng::seed_from_u64(5);
        let scene = random_scene(&mut rng, 150);
        let bvh = scene.build_bvh();

        for _ in 0..2000 {
            let ray = random_ray(&mut rng);
            let max_distance = rng.gen_range(1.0..30.0);
            assert_eq!(
                bvh.is_occluded(&ray, max_distance),
                scene.is_occluded(&ray, max_distance)
            );
        }
    }

    #[test]
    fn test_bvh_keeps_planes_outside_tree() {
        let material = Material::default().shared();
        let mut scene = Scene::default();
        scene.add(Plane::ground(material.clone()));
        scene.add(Sphere::new(Vec3::new(0.0, 0.0, 1.0), 0.5, material));
        let bvh = scene.build_bvh();

        assert_eq!(bvh.len(), 2);
        assert_eq!(bvh.unbounded_len(), 1);

        // Sphere in front of the plane wins.
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);
        let hit = bvh.intersect(&ray, Interval::FORWARD).expect("ray should hit");
        assert!((hit.distance - 3.5).abs() < 1e-5);

        // Plane alone.
        let ray = Ray::new(Vec3::new(3.0, 0.0, 5.0), -Vec3::Z);
        let hit = bvh.intersect(&ray, Interval::FORWARD).expect("ray should hit");
        assert!((hit.distance - 5.0).abs() < 1e-5);
        assert!(bvh.is_occluded(&ray, 6.0));
        assert!(!bvh.is_occluded(&ray, 4.0));
    }

    #[test]
    fn test_emissive_primitives_do_not_occlude() {
        let mut scene = Scene::default();
        scene.add(Sphere::new(Vec3::ZERO, 1.0, Material::default().with_emissive(1.0).shared()));
        let bvh = scene.build_bvh();

        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);
        assert!(bvh.intersect(&ray, Interval::FORWARD).is_some());
        assert!(!bvh.is_occluded(&ray, 10.0));
    }
}
